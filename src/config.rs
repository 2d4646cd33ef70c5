//! Hosts manager configuration.

use std::path::PathBuf;

use crate::error::Result;
use crate::section::Markers;

/// Options for opening a [`HostsManager`](crate::HostsManager).
///
/// # Example
///
/// ```
/// use hosts_manager::ManagerConfig;
///
/// let config = ManagerConfig::new()
///     .with_path("/tmp/hosts")
///     .with_header_label("START dev hosts")
///     .with_trailer_label("END dev hosts");
///
/// assert_eq!(config.path.as_deref(), Some(std::path::Path::new("/tmp/hosts")));
/// assert_eq!(config.markers().unwrap().header(), "# START dev hosts, do not edit");
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Explicit hosts file. When unset the platform's path is used.
    pub path: Option<PathBuf>,

    /// Create the hosts file (and its directory) if missing. Without an
    /// explicit `path` this also selects the platform's throwaway debug file.
    pub debug: bool,

    /// Label for the header line, `# {label}, do not edit`.
    pub header_label: Option<String>,

    /// Label for the trailer line, `# {label}, do not edit`.
    pub trailer_label: Option<String>,

    /// Span every manager event is recorded in.
    pub span: tracing::Span,
}

impl ManagerConfig {
    /// Creates a config for the system hosts file with default markers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: None,
            debug: false,
            header_label: None,
            trailer_label: None,
            span: tracing::Span::none(),
        }
    }

    /// Targets a specific file (useful for testing).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Switches to the platform's debug hosts file.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the header label.
    #[must_use]
    pub fn with_header_label(mut self, label: impl Into<String>) -> Self {
        self.header_label = Some(label.into());
        self
    }

    /// Overrides the trailer label.
    #[must_use]
    pub fn with_trailer_label(mut self, label: impl Into<String>) -> Self {
        self.trailer_label = Some(label.into());
        self
    }

    /// Records manager events inside `span`.
    #[must_use]
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// The section markers these labels produce.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidMarkers`](crate::HostsError::InvalidMarkers)
    /// for labels that cannot delimit a section.
    pub fn markers(&self) -> Result<Markers> {
        Markers::labeled(self.header_label.as_deref(), self.trailer_label.as_deref())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{DEFAULT_HEADER, DEFAULT_TRAILER};

    #[test]
    fn new_sets_defaults() {
        let c = ManagerConfig::new();
        assert!(c.path.is_none());
        assert!(!c.debug);
        let m = c.markers().unwrap();
        assert_eq!(m.header(), DEFAULT_HEADER);
        assert_eq!(m.trailer(), DEFAULT_TRAILER);
    }

    #[test]
    fn with_labels() {
        let c = ManagerConfig::new()
            .with_header_label("Test Header")
            .with_trailer_label("Test Trailer")
            .with_debug(true);
        assert!(c.debug);
        let m = c.markers().unwrap();
        assert_eq!(m.header(), "# Test Header, do not edit");
        assert_eq!(m.trailer(), "# Test Trailer, do not edit");
    }

    #[test]
    fn identical_labels_are_rejected() {
        let c = ManagerConfig::new()
            .with_header_label("same")
            .with_trailer_label("same");
        assert!(matches!(
            c.markers(),
            Err(crate::HostsError::InvalidMarkers(_))
        ));
    }
}
