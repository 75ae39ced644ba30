//! Cgroup detection and memory accounting.
//!
//! Supports both cgroup v1 and v2 for reading the memory limit and working
//! set of the cgroup the current process belongs to (Docker, Kubernetes,
//! Podman).

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ProbeError, Result};

/// Values at or above this are the v1 "unlimited" sentinel
/// (typically 0x7FFFFFFFFFFFF000, page-rounded i64::MAX).
pub const V1_UNLIMITED_THRESHOLD: u64 = 9_000_000_000_000_000_000;

/// Cgroup version detected on the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CgroupVersion {
    /// cgroup v2 (unified hierarchy)
    V2,
    /// cgroup v1 (legacy hierarchy)
    V1,
    /// No cgroup detected (bare metal or unsupported)
    None,
}

impl CgroupVersion {
    /// Detect the cgroup version under the standard mount point.
    pub fn detect() -> Self {
        Self::detect_at(Path::new("/sys/fs/cgroup"))
    }

    /// Detect the cgroup version of a hierarchy mounted at `cgroup_root`.
    pub fn detect_at(cgroup_root: &Path) -> Self {
        // Check cgroup v2 first (unified hierarchy)
        if cgroup_root.join("cgroup.controllers").exists() {
            debug!("Detected cgroup v2 (unified hierarchy)");
            return Self::V2;
        }

        if cgroup_root.join("memory").is_dir() {
            debug!("Detected cgroup v1 (legacy hierarchy)");
            return Self::V1;
        }

        debug!("No cgroup detected at {}", cgroup_root.display());
        Self::None
    }
}

impl std::fmt::Display for CgroupVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V2 => write!(f, "v2"),
            Self::V1 => write!(f, "v1"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Memory controller of the cgroup the process belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupMemory {
    version: CgroupVersion,
    /// Mount point of the memory hierarchy.
    mount: PathBuf,
    /// Directory of the process's own cgroup (equal to `mount` under a cgroup namespace).
    dir: PathBuf,
}

impl CgroupMemory {
    /// Locate the memory cgroup of the current process.
    ///
    /// `proc_self_cgroup` is the path of `/proc/self/cgroup` (or a fixture).
    pub fn resolve(cgroup_root: &Path, proc_self_cgroup: &Path) -> Result<Self> {
        let version = CgroupVersion::detect_at(cgroup_root);
        let mount = match version {
            CgroupVersion::V2 => cgroup_root.to_path_buf(),
            CgroupVersion::V1 => cgroup_root.join("memory"),
            CgroupVersion::None => return Err(ProbeError::NoCgroup),
        };

        let own_path = match fs::read_to_string(proc_self_cgroup) {
            Ok(content) => own_cgroup_path(&content, version),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(ProbeError::io(proc_self_cgroup, e)),
        };

        let dir = own_path
            .as_deref()
            .and_then(|p| join_within(&mount, p))
            .filter(|d| d.is_dir())
            .unwrap_or_else(|| mount.clone());

        debug!("Using {} memory cgroup at {}", version, dir.display());

        Ok(Self {
            version,
            mount,
            dir,
        })
    }

    pub fn version(&self) -> CgroupVersion {
        self.version
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Effective memory limit in bytes.
    ///
    /// Fails with [`ProbeError::NoLimit`] when no level configures a ceiling.
    pub fn limit(&self) -> Result<u64> {
        let limit = match self.version {
            CgroupVersion::V2 => self.limit_v2()?,
            CgroupVersion::V1 => self.limit_v1()?,
            CgroupVersion::None => return Err(ProbeError::NoCgroup),
        };

        limit.ok_or_else(|| ProbeError::NoLimit {
            path: self.dir.clone(),
        })
    }

    /// Working set in bytes: usage minus inactive file cache.
    pub fn used(&self) -> Result<u64> {
        let (usage_file, inactive_key) = match self.version {
            CgroupVersion::V2 => ("memory.current", "inactive_file"),
            CgroupVersion::V1 => ("memory.usage_in_bytes", "total_inactive_file"),
            CgroupVersion::None => return Err(ProbeError::NoCgroup),
        };

        let usage = read_u64(&self.dir.join(usage_file))?;
        let inactive = read_optional(&self.dir.join("memory.stat"))?
            .and_then(|stat| memory_stat_value(&stat, inactive_key))
            .unwrap_or(0);

        trace!(
            "cgroup {} usage: {} bytes, inactive file: {} bytes",
            self.version,
            usage,
            inactive
        );

        Ok(usage.saturating_sub(inactive))
    }

    // memory.max at every level up to the mount; the tightest one applies.
    fn limit_v2(&self) -> Result<Option<u64>> {
        let mut limit: Option<u64> = None;
        let mut seen = false;

        for dir in self.ancestors() {
            let path = dir.join("memory.max");
            let Some(content) = read_optional(&path)? else {
                continue;
            };
            seen = true;

            if let Some(value) = parse_limit(&path, &content)? {
                trace!("cgroup v2 {}: {} bytes", path.display(), value);
                limit = Some(limit.map_or(value, |l| l.min(value)));
            }
        }

        // Only the host's root cgroup legitimately has no memory.max.
        if !seen && !self.is_v2_root_with_memory()? {
            return Err(ProbeError::io(
                self.dir.join("memory.max"),
                std::io::Error::from(ErrorKind::NotFound),
            ));
        }

        Ok(limit)
    }

    // The real root has no cgroup.type (namespace roots do) and offers the
    // memory controller to its children.
    fn is_v2_root_with_memory(&self) -> Result<bool> {
        if self.dir != self.mount || self.mount.join("cgroup.type").exists() {
            return Ok(false);
        }

        let controllers = read_optional(&self.mount.join("cgroup.controllers"))?;
        Ok(controllers.is_some_and(|c| c.split_whitespace().any(|name| name == "memory")))
    }

    fn limit_v1(&self) -> Result<Option<u64>> {
        let path = self.dir.join("memory.limit_in_bytes");
        let content = fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;
        let mut limit = parse_limit(&path, &content)?;

        // hierarchical_memory_limit already folds in the ancestors
        if let Some(stat) = read_optional(&self.dir.join("memory.stat"))? {
            if let Some(value) = memory_stat_value(&stat, "hierarchical_memory_limit") {
                if value < V1_UNLIMITED_THRESHOLD {
                    limit = Some(limit.map_or(value, |l| l.min(value)));
                }
            }
        }

        if let Some(value) = limit {
            trace!("cgroup v1 memory limit: {} bytes", value);
        }

        Ok(limit)
    }

    /// Own cgroup directory followed by its parents, ending at the mount.
    fn ancestors(&self) -> Vec<&Path> {
        self.dir
            .ancestors()
            .take_while(|p| p.starts_with(&self.mount))
            .collect()
    }
}

/// Parse a limit file. `None` means unlimited.
pub fn parse_limit(path: &Path, content: &str) -> Result<Option<u64>> {
    let trimmed = content.trim();
    if trimmed == "max" || trimmed == "-1" {
        return Ok(None);
    }

    let value: u64 = trimmed
        .parse()
        .map_err(|_| ProbeError::parse(path, trimmed))?;

    if value >= V1_UNLIMITED_THRESHOLD {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Look up a key in `memory.stat` ("key value" lines).
pub fn memory_stat_value(stat: &str, key: &str) -> Option<u64> {
    stat.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == key => v.parse().ok(),
            _ => None,
        }
    })
}

/// Extract the process's cgroup path from `/proc/<pid>/cgroup` content.
///
/// v2 lines look like `0::/system.slice/app.service`, v1 lines like
/// `4:memory:/docker/<id>`.
pub fn own_cgroup_path(content: &str, version: CgroupVersion) -> Option<String> {
    content.lines().find_map(|line| {
        let mut parts = line.splitn(3, ':');
        let (id, controllers, path) = (parts.next()?, parts.next()?, parts.next()?);

        let matches = match version {
            CgroupVersion::V2 => id == "0" && controllers.is_empty(),
            CgroupVersion::V1 => controllers.split(',').any(|c| c == "memory"),
            CgroupVersion::None => false,
        };

        matches.then(|| path.trim().to_string())
    })
}

/// Join a cgroup path onto the mount, refusing anything that would escape it.
fn join_within(mount: &Path, cgroup_path: &str) -> Option<PathBuf> {
    let relative = Path::new(cgroup_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(mount.join(relative))
}

fn read_u64(path: &Path) -> Result<u64> {
    let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
    let trimmed = content.trim();
    trimmed
        .parse()
        .map_err(|_| ProbeError::parse(path, trimmed))
}

/// Read a file that may legitimately be absent.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProbeError::io(path, e)),
    }
}
