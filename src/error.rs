//! Error types.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for hosts-manager operations.
pub type Result<T> = std::result::Result<T, HostsError>;

/// Errors returned by hosts-manager operations.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hosts file cannot be both read and written by this process.
    #[error("no read/write access to hosts file: {}", path.display())]
    PermissionDenied {
        /// The checked path.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The hosts file is not valid UTF-8.
    #[error("hosts file {} is not valid UTF-8, convert it before managing it", path.display())]
    NotUtf8 {
        /// The hosts file.
        path: PathBuf,
        /// The decoding failure.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Header/trailer labels that cannot delimit a section.
    #[error("invalid section markers: {0}")]
    InvalidMarkers(String),

    /// Text that does not parse as a dotted-quad IPv4 address.
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    /// A host name that cannot be written to a hosts file line.
    #[error("invalid host name: {0:?}")]
    InvalidName(String),

    /// A host record must carry at least one name.
    #[error("host {0} must have at least one name")]
    EmptyNameSet(Ipv4Addr),

    /// A managed-section line could not be parsed.
    #[error("malformed host line {line_number}: {reason}: {line:?}")]
    MalformedLine {
        /// 1-based line number (0 when parsed outside a file).
        line_number: usize,
        /// The offending text.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The registry already holds a record for this address.
    #[error("duplicate host address: {0}")]
    DuplicateAddress(Ipv4Addr),

    /// No matching record (or name) exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// Removing the last name would leave a record without names.
    #[error("cannot remove {name:?}, the last name of host {address}")]
    LastNameRemoval {
        /// The record's address.
        address: Ipv4Addr,
        /// The name that was asked to be removed.
        name: String,
    },

    /// The trailer marker is present but the header is not.
    #[error("header missing from hosts file {}, trailer is present", path.display())]
    HeaderMissing {
        /// The hosts file.
        path: PathBuf,
    },

    /// The header marker is present but the trailer is not.
    #[error("trailer missing from hosts file {}, header is present", path.display())]
    TrailerMissing {
        /// The hosts file.
        path: PathBuf,
    },

    /// The trailer marker appears before the header marker.
    #[error(
        "managed section markers out of order in {}: trailer on line {trailer_line}, header on line {header_line}",
        path.display()
    )]
    MarkersOutOfOrder {
        /// The hosts file.
        path: PathBuf,
        /// 1-based line of the header.
        header_line: usize,
        /// 1-based line of the trailer.
        trailer_line: usize,
    },

    /// The running OS has no known hosts file location.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// An internal invariant was violated (logic bug or filesystem race).
    #[error("unknown error: {0}")]
    UnknownError(String),
}

impl HostsError {
    /// Returns `true` for permission failures, whether detected by the
    /// access check or surfaced by a later I/O call.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Returns `true` if the managed section markers are inconsistent.
    ///
    /// Such a file must be repaired by hand before it can be managed again.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::HeaderMissing { .. } | Self::TrailerMissing { .. } | Self::MarkersOutOfOrder { .. }
        )
    }

    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line_number: 0,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// Attaches a line number to a [`HostsError::MalformedLine`]; other
    /// variants pass through.
    #[must_use]
    pub(crate) fn at_line(self, number: usize) -> Self {
        match self {
            Self::MalformedLine { line, reason, .. } => Self::MalformedLine {
                line_number: number,
                line,
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_detection() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(HostsError::Io(io).is_permission_denied());

        let err = HostsError::PermissionDenied {
            path: PathBuf::from("/etc/hosts"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());
        assert!(!HostsError::NotFound("x".into()).is_permission_denied());
    }

    #[test]
    fn corruption_variants() {
        let path = PathBuf::from("hosts");
        assert!(HostsError::HeaderMissing { path: path.clone() }.is_corruption());
        assert!(HostsError::TrailerMissing { path: path.clone() }.is_corruption());
        assert!(
            HostsError::MarkersOutOfOrder {
                path,
                header_line: 3,
                trailer_line: 1,
            }
            .is_corruption()
        );
        assert!(!HostsError::UnknownError("x".into()).is_corruption());
    }

    #[test]
    fn at_line_only_touches_malformed() {
        let err = HostsError::malformed("bogus", "no names").at_line(7);
        assert!(matches!(err, HostsError::MalformedLine { line_number: 7, .. }));
        assert!(err.to_string().contains("line 7"));

        let dup = HostsError::DuplicateAddress(Ipv4Addr::LOCALHOST).at_line(7);
        assert!(matches!(dup, HostsError::DuplicateAddress(_)));
    }
}
