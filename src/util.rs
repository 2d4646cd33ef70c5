//! Internal utilities.

use std::path::Path;

use crate::error::{HostsError, Result};

/// Verifies the current process may both read and write `path`.
///
/// Uses `access(path, R_OK | W_OK)`, which checks the real UID's
/// permissions without opening the file.
///
/// # Errors
///
/// Returns [`HostsError::PermissionDenied`] carrying the OS error.
#[cfg(unix)]
pub fn check_read_write(path: &Path) -> Result<()> {
    use std::os::unix::ffi::OsStrExt;

    let c_path = std::ffi::CString::new(path.as_os_str().as_bytes()).map_err(|e| {
        HostsError::PermissionDenied {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        }
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) };
    if rc == 0 {
        Ok(())
    } else {
        Err(HostsError::PermissionDenied {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        })
    }
}

/// Verifies the current process may both read and write `path`.
///
/// Opens the file for reading and for appending without writing anything.
///
/// # Errors
///
/// Returns [`HostsError::PermissionDenied`] carrying the OS error.
#[cfg(not(unix))]
pub fn check_read_write(path: &Path) -> Result<()> {
    let denied = |source| HostsError::PermissionDenied {
        path: path.to_path_buf(),
        source,
    };
    std::fs::File::open(path).map_err(denied)?;
    std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(denied)?;
    Ok(())
}
