//! Managed section markers and their location inside a file.

use std::ops::Range;
use std::path::Path;

use crate::error::{HostsError, Result};

/// Default header line.
pub const DEFAULT_HEADER: &str = "# START HostManager managed hosts, do not edit";

/// Default trailer line.
pub const DEFAULT_TRAILER: &str = "# END of HostManager managed hosts, do not edit";

/// The exact header and trailer lines delimiting the managed section.
///
/// # Example
///
/// ```
/// use hosts_manager::Markers;
///
/// let markers = Markers::labeled(Some("dev hosts"), None).unwrap();
/// assert_eq!(markers.header(), "# dev hosts, do not edit");
/// assert_eq!(markers.trailer(), hosts_manager::section::DEFAULT_TRAILER);
///
/// assert!(Markers::labeled(Some("same"), Some("same")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    header: String,
    trailer: String,
}

impl Markers {
    /// Builds markers from labels, each filling `# {label}, do not edit`.
    /// A missing label keeps the default line.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidMarkers`] if a label is blank or spans
    /// more than one line, or if header and trailer come out identical.
    pub fn labeled(header_label: Option<&str>, trailer_label: Option<&str>) -> Result<Self> {
        let header = header_label.map_or_else(|| Ok(DEFAULT_HEADER.to_string()), label_line)?;
        let trailer = trailer_label.map_or_else(|| Ok(DEFAULT_TRAILER.to_string()), label_line)?;
        if header == trailer {
            return Err(HostsError::InvalidMarkers(format!(
                "header and trailer are both {header:?}"
            )));
        }
        Ok(Self { header, trailer })
    }

    /// Header line, without terminator.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Trailer line, without terminator.
    #[must_use]
    pub fn trailer(&self) -> &str {
        &self.trailer
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            trailer: DEFAULT_TRAILER.to_string(),
        }
    }
}

fn label_line(label: &str) -> Result<String> {
    if label.trim().is_empty() {
        return Err(HostsError::InvalidMarkers("blank label".to_string()));
    }
    if label.contains(['\n', '\r']) {
        return Err(HostsError::InvalidMarkers(format!(
            "label {label:?} contains a line break"
        )));
    }
    Ok(format!("# {label}, do not edit"))
}

/// Where the managed section sits in a file, or why it cannot be found.
///
/// Exactly one variant holds for any sequence of lines. Indices are
/// 0-based line positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionState {
    /// Neither marker is present.
    Absent,
    /// Both markers are present, header first.
    Present {
        /// Header line index.
        header: usize,
        /// Trailer line index.
        trailer: usize,
    },
    /// Only the trailer is present.
    HeaderMissing {
        /// Trailer line index.
        trailer: usize,
    },
    /// Only the header is present.
    TrailerMissing {
        /// Header line index.
        header: usize,
    },
    /// Both are present but the trailer comes first.
    OutOfOrder {
        /// Header line index.
        header: usize,
        /// Trailer line index.
        trailer: usize,
    },
}

impl SectionState {
    /// Returns `true` if the markers are inconsistent.
    #[must_use]
    pub const fn is_corrupted(&self) -> bool {
        matches!(
            self,
            Self::HeaderMissing { .. } | Self::TrailerMissing { .. } | Self::OutOfOrder { .. }
        )
    }

    /// The body lines strictly between header and trailer, when present.
    #[must_use]
    pub const fn body(&self) -> Option<Range<usize>> {
        match *self {
            Self::Present { header, trailer } => Some(header + 1..trailer),
            _ => None,
        }
    }

    /// Turns corruption into the matching error for `path`.
    ///
    /// Returns `Ok(None)` when absent and `Ok(Some(body))` when present.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::HeaderMissing`], [`HostsError::TrailerMissing`]
    /// or [`HostsError::MarkersOutOfOrder`].
    pub fn into_body(self, path: &Path) -> Result<Option<Range<usize>>> {
        let path = path.to_path_buf();
        match self {
            Self::Absent => Ok(None),
            Self::Present { header, trailer } => Ok(Some(header + 1..trailer)),
            Self::HeaderMissing { .. } => Err(HostsError::HeaderMissing { path }),
            Self::TrailerMissing { .. } => Err(HostsError::TrailerMissing { path }),
            Self::OutOfOrder { header, trailer } => Err(HostsError::MarkersOutOfOrder {
                path,
                header_line: header + 1,
                trailer_line: trailer + 1,
            }),
        }
    }
}

/// Classifies `lines` against `markers`.
///
/// A line matches a marker when equal to it once any trailing `\n` or
/// `\r\n` is stripped, so the final line matches with or without a
/// terminator. The first occurrence of each marker wins.
#[must_use]
pub fn locate<S: AsRef<str>>(lines: &[S], markers: &Markers) -> SectionState {
    let find = |marker: &str| {
        lines
            .iter()
            .position(|line| strip_terminator(line.as_ref()) == marker)
    };

    match (find(markers.header()), find(markers.trailer())) {
        (None, None) => SectionState::Absent,
        (Some(header), Some(trailer)) if header < trailer => {
            SectionState::Present { header, trailer }
        }
        (Some(header), Some(trailer)) => SectionState::OutOfOrder { header, trailer },
        (None, Some(trailer)) => SectionState::HeaderMissing { trailer },
        (Some(header), None) => SectionState::TrailerMissing { header },
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
