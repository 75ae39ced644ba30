//! Probe error types.

use std::fmt;
use std::path::PathBuf;

/// Errors returned by resource probes.
#[derive(Debug)]
pub enum ProbeError {
    /// The query has no meaning on this platform.
    Unsupported { operation: &'static str },

    /// No cgroup hierarchy is mounted.
    NoCgroup,

    /// The cgroup reports no memory limit ("max" or the v1 sentinel).
    NoLimit { path: PathBuf },

    /// Reading OS metadata failed.
    Io { path: PathBuf, error: std::io::Error },

    /// OS metadata had unexpected content.
    Parse { path: PathBuf, value: String },
}

impl ProbeError {
    /// True for the unsupported-platform error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ProbeError::Unsupported { .. })
    }

    /// True when the cgroup is configured without a memory ceiling.
    pub fn is_no_limit(&self) -> bool {
        matches!(self, ProbeError::NoLimit { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        ProbeError::Io {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, value: impl Into<String>) -> Self {
        ProbeError::Parse {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Unsupported { operation } => {
                write!(f, "{} is not supported on this platform", operation)
            }
            ProbeError::NoCgroup => write!(f, "no cgroup hierarchy detected"),
            ProbeError::NoLimit { path } => {
                write!(f, "no memory limit configured at {}", path.display())
            }
            ProbeError::Io { path, error } => {
                write!(f, "failed to read {}: {}", path.display(), error)
            }
            ProbeError::Parse { path, value } => {
                write!(f, "unexpected content in {}: '{}'", path.display(), value)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = ProbeError::Unsupported {
            operation: "container_mem_limit",
        };
        assert_eq!(
            err.to_string(),
            "container_mem_limit is not supported on this platform"
        );

        let err = ProbeError::parse("/sys/fs/cgroup/memory.max", "garbage");
        assert_eq!(
            err.to_string(),
            "unexpected content in /sys/fs/cgroup/memory.max: 'garbage'"
        );
    }

    #[test]
    fn test_kind_helpers() {
        let unsupported = ProbeError::Unsupported {
            operation: "container_mem_used",
        };
        assert!(unsupported.is_unsupported());
        assert!(!unsupported.is_no_limit());

        let no_limit = ProbeError::NoLimit {
            path: PathBuf::from("/sys/fs/cgroup"),
        };
        assert!(no_limit.is_no_limit());
        assert!(!no_limit.is_unsupported());
    }

    #[test]
    fn test_io_source() {
        let err = ProbeError::io(
            "/proc/1/cgroup",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.source().is_some());
        assert!(ProbeError::NoCgroup.source().is_none());
    }
}
