//! System resource detection.
//!
//! Cgroup-aware memory accounting for containerized environments, plus the
//! whole-host statistics used when no container view is available.
//!
//! # Cgroup Support
//!
//! - **cgroup v2**: Modern unified hierarchy (default on newer kernels)
//! - **cgroup v1**: Legacy hierarchy (still common in production)
//!
//! # Example
//!
//! ```rust,ignore
//! use container_probe::system::{HostMemory, MemoryStats};
//!
//! let probe = container_probe::platform_probe();
//! let stats = MemoryStats::effective(&probe, HostMemory::system());
//! println!("{} of {} bytes used ({:?})", stats.used, stats.total, stats.source);
//! ```

mod cgroup;
mod memory;

pub use cgroup::{
    memory_stat_value, own_cgroup_path, parse_limit, CgroupMemory, CgroupVersion,
    V1_UNLIMITED_THRESHOLD,
};
pub use memory::{
    format_bytes, parse_meminfo_kb, ContainerMemory, HostMemory, MemorySource, MemoryStats,
};
