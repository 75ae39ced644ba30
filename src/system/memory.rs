//! Effective memory accounting.
//!
//! Combines the container view from a [`ResourceProbe`] with whole-host
//! statistics, which callers fall back to when the container cannot be
//! queried.

use std::path::Path;

use serde::Serialize;
use sysinfo::System;
use tracing::{debug, trace, warn};

use crate::error::{ProbeError, Result};
use crate::probe::ResourceProbe;

/// Container memory limit and working set, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerMemory {
    /// Memory limit in bytes
    pub limit: u64,
    /// Working set in bytes
    pub used: u64,
}

impl ContainerMemory {
    /// Query both values from a probe. Either failure is returned as-is.
    pub fn read<P: ResourceProbe + ?Sized>(probe: &P) -> Result<Self> {
        Ok(Self {
            limit: probe.container_mem_limit()?,
            used: probe.container_mem_used()?,
        })
    }

    /// Used memory as a fraction of the limit (0.0 - 1.0+).
    pub fn usage_ratio(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        self.used as f64 / self.limit as f64
    }
}

/// Where a [`MemoryStats`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemorySource {
    Container,
    Host,
}

/// Memory ceiling and consumption the process should size itself against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub source: MemorySource,
}

impl MemoryStats {
    /// Container values when running in a container with a readable limit,
    /// host values otherwise.
    ///
    /// The container limit is clamped to host total memory, since an
    /// oversized limit cannot be backed anyway.
    pub fn effective<P: ResourceProbe + ?Sized>(probe: &P, host: HostMemory) -> Self {
        let in_container = probe.in_container().unwrap_or_else(|e| {
            warn!("Container detection failed, assuming host: {}", e);
            false
        });

        if in_container {
            match ContainerMemory::read(probe) {
                Ok(mem) => {
                    return Self {
                        total: mem.limit.min(host.total),
                        used: mem.used,
                        source: MemorySource::Container,
                    };
                }
                Err(e) => debug!("Container memory unavailable, using host memory: {}", e),
            }
        }

        Self {
            total: host.total,
            used: host.used,
            source: MemorySource::Host,
        }
    }
}

/// Whole-host physical memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostMemory {
    pub total: u64,
    /// Total minus available
    pub used: u64,
}

impl HostMemory {
    /// Snapshot of the running host's memory.
    pub fn system() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let host = Self {
            total: sys.total_memory(),
            used: sys.used_memory(),
        };
        trace!("Host memory: {} total, {} used", host.total, host.used);
        host
    }

    /// Read `meminfo` under `proc_root`, for hosts mounted somewhere other
    /// than `/`.
    pub fn from_meminfo(proc_root: &Path) -> Result<Self> {
        let path = proc_root.join("meminfo");
        let content = std::fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;

        let field = |key: &str| {
            parse_meminfo_kb(&content, key).ok_or_else(|| ProbeError::parse(&path, key))
        };
        let total = field("MemTotal")?;
        let available = field("MemAvailable")?;

        Ok(Self {
            total: total * 1024,
            used: total.saturating_sub(available) * 1024,
        })
    }
}

/// Find `Key:   12345 kB` in meminfo content.
pub fn parse_meminfo_kb(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let (k, rest) = line.split_once(':')?;
        if k != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// Format a byte count for humans.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{} bytes", bytes)
    }
}
