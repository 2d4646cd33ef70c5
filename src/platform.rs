//! Hosts file locations per operating system.

use std::path::PathBuf;

use crate::error::{HostsError, Result};

const LINUX_HOSTS_PATH: &str = "/etc/hosts";
const WINDOWS_HOSTS_PATH: &str = r"C:\Windows\System32\drivers\etc\hosts";

/// Sandbox directory created under the temp dir in debug mode.
const DEBUG_DIR: &str = "HostsManager";

/// Operating systems with a known hosts file location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, `/etc/hosts`.
    Linux,
    /// Windows, `C:\Windows\System32\drivers\etc\hosts`.
    Windows,
}

impl Platform {
    /// Detects the running platform.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::UnsupportedPlatform`] on any other OS.
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps an OS name as reported by [`std::env::consts::OS`].
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::UnsupportedPlatform`] for unknown names.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(HostsError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// The system hosts file.
    #[must_use]
    pub fn hosts_path(self) -> PathBuf {
        match self {
            Self::Linux => PathBuf::from(LINUX_HOSTS_PATH),
            Self::Windows => PathBuf::from(WINDOWS_HOSTS_PATH),
        }
    }

    /// A throwaway hosts file for debug runs.
    ///
    /// `/tmp/HostsManager/hosts` on Linux, `%TEMP%\HostsManager\hosts` on
    /// Windows.
    #[must_use]
    pub fn debug_hosts_path(self) -> PathBuf {
        let base = match self {
            Self::Linux => PathBuf::from("/tmp"),
            Self::Windows => std::env::temp_dir(),
        };
        base.join(DEBUG_DIR).join("hosts")
    }
}
