//! container_probe - Container memory introspection.
//!
//! Lets a process find out whether it runs inside a container and, if so,
//! what memory ceiling the container runtime imposes and how much of it is
//! in use, so that it can size itself to the effective limit instead of the
//! host's physical memory.
//!
//! # Platforms
//!
//! The probe is chosen at build time:
//!
//! - **Linux**: cgroup v1 and v2, with nested hierarchies and cgroup namespaces
//! - **Other platforms**: never in a container; memory queries fail with
//!   [`ProbeError::Unsupported`]
//!
//! Each call is a fresh point-in-time read of OS metadata. Nothing is cached
//! and nothing is enforced.
//!
//! # Example
//!
//! ```rust,ignore
//! use container_probe::{container_mem_limit, in_container, HostMemory, MemoryStats};
//!
//! if in_container()? {
//!     println!("container limit: {:?}", container_mem_limit());
//! }
//!
//! let probe = container_probe::platform_probe();
//! let stats = MemoryStats::effective(&probe, HostMemory::system());
//! println!("sizing against {} bytes", stats.total);
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod report;
pub mod system;

// Re-exports for convenience
pub use config::Config;
pub use error::{ProbeError, Result};
#[cfg(target_os = "linux")]
pub use probe::CgroupProbe;
pub use probe::{
    container_mem_limit, container_mem_used, in_container, platform_probe, platform_probe_at,
    PlatformProbe, ResourceProbe, UnsupportedProbe,
};
pub use report::ProbeReport;
pub use system::{CgroupVersion, ContainerMemory, HostMemory, MemorySource, MemoryStats};
