//! Serializable snapshot of every probe query.

use serde::Serialize;

use crate::error::Result;
use crate::probe::ResourceProbe;
use crate::system::{CgroupVersion, HostMemory, MemoryStats};

/// Either a value or the error message of a failed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome<T> {
    Value(T),
    Error(String),
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

/// Results of the three probe queries plus the derived effective memory.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub in_container: Outcome<bool>,
    pub memory_limit: Outcome<u64>,
    pub memory_used: Outcome<u64>,
    pub cgroup_version: CgroupVersion,
    pub host: HostMemory,
    pub effective: MemoryStats,
}

impl ProbeReport {
    /// Run every query against `probe`, falling back to `host` for the
    /// effective memory.
    pub fn collect<P: ResourceProbe + ?Sized>(probe: &P, host: HostMemory) -> Self {
        Self {
            in_container: probe.in_container().into(),
            memory_limit: probe.container_mem_limit().into(),
            memory_used: probe.container_mem_used().into(),
            cgroup_version: probe.cgroup_version(),
            host,
            effective: MemoryStats::effective(probe, host),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::UnsupportedProbe;

    const HOST: HostMemory = HostMemory {
        total: 4096,
        used: 1024,
    };

    #[test]
    fn test_unsupported_report() {
        let report = ProbeReport::collect(&UnsupportedProbe, HOST);

        assert_eq!(report.in_container, Outcome::Value(false));
        assert_eq!(
            report.memory_limit,
            Outcome::Error("container_mem_limit is not supported on this platform".into())
        );
        assert_eq!(
            report.memory_used,
            Outcome::Error("container_mem_used is not supported on this platform".into())
        );
        assert_eq!(report.cgroup_version, CgroupVersion::None);
        assert_eq!(report.effective.total, 4096);
        assert_eq!(report.effective.used, 1024);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ProbeReport::collect(&UnsupportedProbe, HOST);
        let line = report.to_json().expect("report serializes");
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(json["in_container"]["value"], serde_json::json!(false));
        assert!(json["memory_limit"]["error"].is_string());
        assert_eq!(json["cgroup_version"], serde_json::json!("none"));
        assert_eq!(json["host"]["total"], serde_json::json!(4096));
        assert_eq!(json["effective"]["source"], serde_json::json!("host"));
        assert_eq!(json["effective"]["used"], serde_json::json!(1024));
    }
}
