//! Container resource probes.
//!
//! One [`ResourceProbe`] implementation per platform family. The variant used
//! by the free functions is chosen at build time:
//!
//! - **Linux**: [`CgroupProbe`] reads `/proc` and the cgroup hierarchy.
//! - **Everything else**: [`UnsupportedProbe`] reports "not in a container"
//!   and fails both memory queries with [`ProbeError::Unsupported`].
//!
//! Every call is a fresh point-in-time read; nothing is cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use container_probe::probe;
//!
//! if probe::in_container()? {
//!     match probe::container_mem_limit() {
//!         Ok(limit) => println!("limit: {} bytes", limit),
//!         Err(e) if e.is_no_limit() => println!("no limit configured"),
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! ```
//!
//! [`ProbeError::Unsupported`]: crate::ProbeError::Unsupported

#[cfg(target_os = "linux")]
mod linux;
mod unsupported;

use std::path::Path;

#[cfg(target_os = "linux")]
pub use linux::CgroupProbe;
pub use unsupported::UnsupportedProbe;

use crate::error::Result;
use crate::system::CgroupVersion;

/// Point-in-time container introspection.
///
/// All implementations are stateless queries and safe to call from any
/// thread. Memory values are in bytes.
pub trait ResourceProbe: Send + Sync {
    /// Whether the current process is confined by a container runtime.
    ///
    /// Errors only when the OS metadata cannot be read, never to mean "no".
    fn in_container(&self) -> Result<bool>;

    /// Memory ceiling imposed on the container.
    fn container_mem_limit(&self) -> Result<u64>;

    /// Memory currently attributable to the container.
    fn container_mem_used(&self) -> Result<u64>;

    /// Cgroup hierarchy backing the memory queries.
    fn cgroup_version(&self) -> CgroupVersion {
        CgroupVersion::None
    }
}

impl<P: ResourceProbe + ?Sized> ResourceProbe for &P {
    fn in_container(&self) -> Result<bool> {
        (**self).in_container()
    }

    fn container_mem_limit(&self) -> Result<u64> {
        (**self).container_mem_limit()
    }

    fn container_mem_used(&self) -> Result<u64> {
        (**self).container_mem_used()
    }

    fn cgroup_version(&self) -> CgroupVersion {
        (**self).cgroup_version()
    }
}

/// Probe linked for this build target.
#[cfg(target_os = "linux")]
pub type PlatformProbe = CgroupProbe;

/// Probe linked for this build target.
#[cfg(not(target_os = "linux"))]
pub type PlatformProbe = UnsupportedProbe;

/// Probe for the running system.
pub fn platform_probe() -> PlatformProbe {
    PlatformProbe::default()
}

/// Probe reading OS metadata under `root` instead of `/`.
///
/// The root is ignored where containers cannot be inspected.
#[cfg(target_os = "linux")]
pub fn platform_probe_at(root: &Path) -> PlatformProbe {
    CgroupProbe::with_root(root)
}

/// Probe reading OS metadata under `root` instead of `/`.
///
/// The root is ignored where containers cannot be inspected.
#[cfg(not(target_os = "linux"))]
pub fn platform_probe_at(_root: &Path) -> PlatformProbe {
    UnsupportedProbe
}

/// Whether the current process runs inside a container.
pub fn in_container() -> Result<bool> {
    platform_probe().in_container()
}

/// Memory limit of the enclosing container in bytes.
pub fn container_mem_limit() -> Result<u64> {
    platform_probe().container_mem_limit()
}

/// Memory used by the enclosing container in bytes.
pub fn container_mem_used() -> Result<u64> {
    platform_probe().container_mem_used()
}
