//! Cgroup-backed probe for Linux.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::ResourceProbe;
use crate::error::{ProbeError, Result};
use crate::system::{CgroupMemory, CgroupVersion};

/// Substrings of cgroup paths and mount sources left behind by container runtimes.
const RUNTIME_MARKERS: &[&str] = &[
    "docker",
    "kubepods",
    "containerd",
    "libpod",
    "lxc",
    "crio",
    "/ecs/",
    "containers/storage",
    "actions_job",
];

/// Files dropped into the root filesystem by Docker and Podman.
const MARKER_FILES: &[&str] = &[".dockerenv", "run/.containerenv"];

/// Probe reading `/proc` and the cgroup hierarchy.
///
/// All paths are resolved under a host root (`/` by default) so the probe
/// can be pointed at a mounted host filesystem or a fixture tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupProbe {
    root: PathBuf,
}

impl CgroupProbe {
    pub fn new() -> Self {
        Self::with_root("/")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn proc_root(&self) -> PathBuf {
        self.root.join("proc")
    }

    pub fn cgroup_root(&self) -> PathBuf {
        self.root.join("sys/fs/cgroup")
    }

    /// Resolve the memory cgroup of the current process.
    pub fn memory_cgroup(&self) -> Result<CgroupMemory> {
        CgroupMemory::resolve(&self.cgroup_root(), &self.proc_root().join("self/cgroup"))
    }

    fn has_marker_file(&self) -> bool {
        MARKER_FILES.iter().any(|f| {
            let found = self.root.join(f).exists();
            if found {
                debug!("Container marker file found: /{}", f);
            }
            found
        })
    }

    fn init_cgroup_has_marker(&self) -> Result<bool> {
        let path = self.proc_root().join("1/cgroup");
        let content = fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;

        let found = content.lines().any(|line| {
            let cgroup_path = line.splitn(3, ':').nth(2).unwrap_or("");
            contains_marker(cgroup_path)
        });

        if found {
            debug!("Container runtime cgroup found in {}", path.display());
        }
        Ok(found)
    }

    fn root_mount_has_marker(&self) -> Result<bool> {
        let path = self.proc_root().join("self/mountinfo");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("{} not found, skipping mount check", path.display());
                return Ok(false);
            }
            Err(e) => return Err(ProbeError::io(&path, e)),
        };

        // Field 5 is the mount point; the root mount's options name its source layers.
        let found = content
            .lines()
            .filter(|line| line.split_whitespace().nth(4) == Some("/"))
            .any(contains_marker);

        if found {
            debug!("Root filesystem is mounted from a container runtime");
        }
        Ok(found)
    }
}

impl Default for CgroupProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for CgroupProbe {
    fn in_container(&self) -> Result<bool> {
        if self.has_marker_file() {
            return Ok(true);
        }
        if self.init_cgroup_has_marker()? {
            return Ok(true);
        }
        self.root_mount_has_marker()
    }

    fn container_mem_limit(&self) -> Result<u64> {
        self.memory_cgroup()?.limit()
    }

    fn container_mem_used(&self) -> Result<u64> {
        self.memory_cgroup()?.used()
    }

    fn cgroup_version(&self) -> CgroupVersion {
        CgroupVersion::detect_at(&self.cgroup_root())
    }
}

fn contains_marker(s: &str) -> bool {
    RUNTIME_MARKERS.iter().any(|m| s.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_marker() {
        assert!(contains_marker("/kubepods/besteffort/pod1/abc"));
        assert!(contains_marker("/system.slice/docker-abc.scope"));
        assert!(!contains_marker("/init.scope"));
        assert!(!contains_marker("/user.slice/user-1000.slice"));
    }

    #[test]
    fn test_paths_under_root() {
        let probe = CgroupProbe::with_root("/host");
        assert_eq!(probe.proc_root(), PathBuf::from("/host/proc"));
        assert_eq!(probe.cgroup_root(), PathBuf::from("/host/sys/fs/cgroup"));
        assert_eq!(CgroupProbe::default().root(), Path::new("/"));
    }

    #[test]
    fn test_missing_proc_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = CgroupProbe::with_root(dir.path());
        assert!(matches!(probe.in_container(), Err(ProbeError::Io { .. })));
    }

    #[test]
    fn test_no_cgroup_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let probe = CgroupProbe::with_root(dir.path());
        assert!(matches!(
            probe.container_mem_limit(),
            Err(ProbeError::NoCgroup)
        ));
        assert!(matches!(
            probe.container_mem_used(),
            Err(ProbeError::NoCgroup)
        ));
        assert_eq!(probe.cgroup_version(), CgroupVersion::None);
    }
}
