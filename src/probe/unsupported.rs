//! Fallback probe for platforms without container memory accounting.

use super::ResourceProbe;
use crate::error::{ProbeError, Result};

/// Probe for platforms where containers of the cgroup kind cannot exist.
///
/// Containment is a definite `false`. The memory queries would only mean
/// something inside a container, so they fail with
/// [`ProbeError::Unsupported`] instead of reporting a misleading zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnsupportedProbe;

impl ResourceProbe for UnsupportedProbe {
    fn in_container(&self) -> Result<bool> {
        Ok(false)
    }

    fn container_mem_limit(&self) -> Result<u64> {
        Err(ProbeError::Unsupported {
            operation: "container_mem_limit",
        })
    }

    fn container_mem_used(&self) -> Result<u64> {
        Err(ProbeError::Unsupported {
            operation: "container_mem_used",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_in_container() {
        for _ in 0..3 {
            assert!(!UnsupportedProbe.in_container().unwrap());
        }
    }

    #[test]
    fn test_memory_queries_unsupported() {
        let limit = UnsupportedProbe.container_mem_limit().unwrap_err();
        assert!(limit.is_unsupported());
        assert_eq!(
            limit.to_string(),
            "container_mem_limit is not supported on this platform"
        );

        let used = UnsupportedProbe.container_mem_used().unwrap_err();
        assert!(used.is_unsupported());
    }

    #[test]
    fn test_call_sequence() {
        let probe = UnsupportedProbe;
        assert!(matches!(probe.in_container(), Ok(false)));
        assert!(matches!(
            probe.container_mem_limit(),
            Err(ProbeError::Unsupported { .. })
        ));
        assert!(matches!(
            probe.container_mem_used(),
            Err(ProbeError::Unsupported { .. })
        ));
    }
}
