//! Probe configuration.

use std::path::{Path, PathBuf};

use super::parse::env_opt;
use super::ConfigError;
use crate::error::Result;
use crate::probe::{platform_probe_at, PlatformProbe};
use crate::system::HostMemory;

/// Probe configuration loaded from environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Root under which `proc/` and `sys/fs/cgroup/` are read (PROBE_HOST_ROOT).
    pub host_root: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host_root: PathBuf::from("/"),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let Some(root) = env_opt("PROBE_HOST_ROOT") else {
            return Ok(Self::default());
        };

        let host_root = PathBuf::from(&root);
        if !host_root.is_absolute() {
            return Err(ConfigError::Invalid {
                key: "PROBE_HOST_ROOT".into(),
                message: format!("'{}' is not an absolute path", root),
            });
        }

        Ok(Self { host_root })
    }

    /// Build the platform probe for this configuration.
    pub fn probe(&self) -> PlatformProbe {
        platform_probe_at(&self.host_root)
    }

    pub fn proc_root(&self) -> PathBuf {
        self.host_root.join("proc")
    }

    /// Host memory for the configured root: the live system for `/`, the
    /// mounted `proc/meminfo` otherwise.
    pub fn host_memory(&self) -> Result<HostMemory> {
        if self.host_root == Path::new("/") {
            Ok(HostMemory::system())
        } else {
            HostMemory::from_meminfo(&self.proc_root())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_host_root_from_env() {
        let _guard = crate::config::ENV_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        env::remove_var("PROBE_HOST_ROOT");
        assert_eq!(ProbeConfig::from_env().unwrap(), ProbeConfig::default());

        env::set_var("PROBE_HOST_ROOT", "/host");
        let config = ProbeConfig::from_env().unwrap();
        assert_eq!(config.host_root, PathBuf::from("/host"));
        assert_eq!(config.proc_root(), PathBuf::from("/host/proc"));

        env::set_var("PROBE_HOST_ROOT", "relative/root");
        assert!(matches!(
            ProbeConfig::from_env(),
            Err(ConfigError::Invalid { .. })
        ));

        env::remove_var("PROBE_HOST_ROOT");
    }

    #[test]
    fn test_host_memory_follows_root() {
        let live = ProbeConfig::default().host_memory().unwrap();
        assert!(live.total > 0);

        let dir = tempfile::tempdir().unwrap();
        let config = ProbeConfig {
            host_root: dir.path().to_path_buf(),
        };
        assert!(config.host_memory().is_err());

        std::fs::create_dir(dir.path().join("proc")).unwrap();
        std::fs::write(
            dir.path().join("proc/meminfo"),
            "MemTotal: 2048 kB\nMemAvailable: 512 kB\n",
        )
        .unwrap();
        let host = config.host_memory().unwrap();
        assert_eq!(host.total, 2048 * 1024);
        assert_eq!(host.used, 1536 * 1024);
    }
}
