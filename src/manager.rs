//! The hosts file controller.
//!
//! Ties the pieces together: resolve the file, make sure it carries a managed
//! section, decode it, mutate it in memory and splice it back on
//! [`save`](HostsManager::save).

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::config::ManagerConfig;
use crate::error::{HostsError, Result};
use crate::hosts_file::{HostsFile, WriteMode, line_ending};
use crate::platform::Platform;
use crate::record::{HostRecord, parse_address};
use crate::registry::HostRegistry;
use crate::section::{Markers, SectionState, locate};
use crate::util::check_read_write;

/// Owns the managed section of one hosts file.
///
/// # Lifecycle
///
/// 1. [`open`](Self::open) checks access, appends an empty section if the
///    file has none, and decodes the existing one otherwise. A file with a
///    corrupted section is refused and left untouched.
/// 2. [`add_host`](Self::add_host), [`remove_host`](Self::remove_host) and
///    [`remove_name`](Self::remove_name) change the in-memory registry only.
/// 3. [`save`](Self::save) writes the section back in place.
///
/// Nothing guards against another process editing the file between open and
/// save; the last writer wins.
///
/// # Example
///
/// ```rust,ignore
/// use hosts_manager::{HostsManager, ManagerConfig};
///
/// let mut hosts = HostsManager::open(ManagerConfig::new())?;
/// hosts.add_host("10.0.0.5", ["api.local", "web.local"])?;
/// hosts.save()?;
/// ```
pub struct HostsManager {
    file: HostsFile,
    markers: Markers,
    registry: HostRegistry,
    clock: Box<dyn Clock>,
    span: tracing::Span,
    dirty: bool,
}

impl HostsManager {
    /// Opens the hosts file described by `config`, using wall-clock time.
    ///
    /// # Errors
    ///
    /// See [`open_with_clock`](Self::open_with_clock).
    pub fn open(config: ManagerConfig) -> Result<Self> {
        Self::open_with_clock(config, Box::new(SystemClock))
    }

    /// Opens the hosts file described by `config`.
    ///
    /// # Errors
    ///
    /// - [`HostsError::InvalidMarkers`] for unusable labels, before the file
    ///   is touched.
    /// - [`HostsError::UnsupportedPlatform`] if no path is configured and the
    ///   OS is unknown.
    /// - [`HostsError::PermissionDenied`] without read/write access.
    /// - [`HostsError::HeaderMissing`], [`HostsError::TrailerMissing`] or
    ///   [`HostsError::MarkersOutOfOrder`] for a corrupted section.
    /// - [`HostsError::MalformedLine`] or [`HostsError::DuplicateAddress`]
    ///   for an undecodable section body.
    /// - [`HostsError::UnknownError`] if a freshly appended section cannot be
    ///   found again.
    pub fn open_with_clock(config: ManagerConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let span = config.span.clone();
        let _guard = span.enter();

        let markers = config.markers()?;
        let file = HostsFile::new(resolve_path(&config)?);
        if config.debug {
            tracing::debug!(path = %file.path().display(), "Debug mode, creating hosts file if missing");
            file.ensure_exists()?;
        }
        check_read_write(file.path())?;

        let mut manager = Self {
            file,
            markers,
            registry: HostRegistry::new(),
            clock,
            span: config.span,
            dirty: false,
        };
        manager.initialize()?;
        manager.load()?;
        Ok(manager)
    }

    /// The managed file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The section markers in use.
    #[must_use]
    pub const fn markers(&self) -> &Markers {
        &self.markers
    }

    /// The in-memory managed hosts, including unsaved changes.
    #[must_use]
    pub const fn hosts(&self) -> &HostRegistry {
        &self.registry
    }

    /// Returns every managed record carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<&HostRecord> {
        self.registry.find_by_name(name)
    }

    /// Returns `true` if there are changes not yet saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Maps `names` to `address`.
    ///
    /// Names are merged into an existing record for the address; otherwise a
    /// new record is appended. Merging only known names changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidAddress`] for non-IPv4 text,
    /// [`HostsError::EmptyNameSet`] if `names` holds no name, or
    /// [`HostsError::InvalidName`].
    pub fn add_host<I, S>(&mut self, address: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let span = self.span.clone();
        let _guard = span.enter();

        let address = parse_address(address)?;
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Err(HostsError::EmptyNameSet(address));
        }

        if let Some(record) = self.registry.find_by_address_mut(address) {
            if record.add_names(&names, self.clock.as_ref())? {
                tracing::debug!(%address, names = ?record.names(), "Merged names into host");
                self.dirty = true;
            } else {
                tracing::debug!(%address, "Host already has these names");
            }
        } else {
            let now = self.clock.now();
            self.registry.add(address, &names, now)?;
            tracing::debug!(%address, ?names, "Added host");
            self.dirty = true;
        }
        Ok(())
    }

    /// Removes the record for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidAddress`] or [`HostsError::NotFound`].
    pub fn remove_host(&mut self, address: &str) -> Result<HostRecord> {
        let span = self.span.clone();
        let _guard = span.enter();

        let address = parse_address(address)?;
        let removed = self.registry.remove_by_address(address)?;
        self.dirty = true;
        tracing::debug!(%address, "Removed host");
        Ok(removed)
    }

    /// Removes one name from the record for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidAddress`], [`HostsError::NotFound`] if
    /// there is no such record or name, or [`HostsError::LastNameRemoval`].
    pub fn remove_name(&mut self, address: &str, name: &str) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        let address = parse_address(address)?;
        let record = self
            .registry
            .find_by_address_mut(address)
            .ok_or_else(|| HostsError::NotFound(format!("host {address}")))?;
        record.remove_name(name)?;
        self.dirty = true;
        tracing::debug!(%address, name, "Removed name from host");
        Ok(())
    }

    /// Writes the registry back into the file's managed section.
    ///
    /// The file is re-read first; lines outside the section are written back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`], a corruption error if the section was
    /// damaged since it was opened, or [`HostsError::UnknownError`] if it
    /// disappeared.
    pub fn save(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        let (lines, body) = self.read_section()?;
        let section = codec::encode(&self.registry, &self.markers);
        let updated = codec::splice(&lines, body, section);
        self.file.write_lines(&updated, WriteMode::Replace)?;
        self.dirty = false;

        tracing::info!(
            path = %self.file.path().display(),
            hosts = self.registry.len(),
            "Saved managed hosts"
        );
        Ok(())
    }

    /// Drops unsaved changes and decodes the section from disk again.
    ///
    /// # Errors
    ///
    /// As [`save`](Self::save), plus decode errors.
    pub fn reload(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();
        self.load()
    }

    /// Appends an empty section if the file has none.
    fn initialize(&self) -> Result<()> {
        let lines = self.file.read_lines()?;
        if self.classify(&lines)?.is_some() {
            return Ok(());
        }

        let eol = line_ending(&lines);
        self.file.write_lines(
            &[
                format!("{}{eol}", self.markers.header()),
                format!("{}{eol}", self.markers.trailer()),
            ],
            WriteMode::Append,
        )?;
        tracing::info!(path = %self.file.path().display(), "Initialized managed hosts section");

        let lines = self.file.read_lines()?;
        if locate(&lines, &self.markers).body().is_none() {
            return Err(HostsError::UnknownError(format!(
                "managed section not found in {} right after writing it",
                self.file.path().display()
            )));
        }
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let (lines, body) = self.read_section()?;
        self.registry = codec::decode(&lines[body.clone()], body.start + 1)?;
        self.dirty = false;
        tracing::debug!(
            path = %self.file.path().display(),
            hosts = self.registry.len(),
            "Loaded managed hosts"
        );
        Ok(())
    }

    /// Reads the file and locates a section that must exist.
    fn read_section(&self) -> Result<(Vec<String>, Range<usize>)> {
        let lines = self.file.read_lines()?;
        let body = self.classify(&lines)?.ok_or_else(|| {
            HostsError::UnknownError(format!(
                "managed section missing from initialized hosts file {}",
                self.file.path().display()
            ))
        })?;
        Ok((lines, body))
    }

    fn classify(&self, lines: &[String]) -> Result<Option<Range<usize>>> {
        let state = locate(lines, &self.markers);
        if state.is_corrupted() {
            tracing::warn!(
                path = %self.file.path().display(),
                ?state,
                "Managed hosts section is corrupted, refusing to modify the file"
            );
        } else if state == SectionState::Absent {
            tracing::debug!(path = %self.file.path().display(), "No managed hosts section");
        }
        state.into_body(self.file.path())
    }
}

fn resolve_path(config: &ManagerConfig) -> Result<PathBuf> {
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Using configured hosts file");
        return Ok(path.clone());
    }

    let platform = Platform::current()?;
    let path = if config.debug {
        platform.debug_hosts_path()
    } else {
        platform.hosts_path()
    };
    tracing::debug!(?platform, debug = config.debug, path = %path.display(), "Resolved hosts file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::section::{DEFAULT_HEADER, DEFAULT_TRAILER};

    fn open_at(path: &Path, secs: i64) -> Result<HostsManager> {
        HostsManager::open_with_clock(
            ManagerConfig::new().with_path(path),
            Box::new(FixedClock::from_epoch_secs(secs)),
        )
    }

    #[test]
    fn empty_file_gets_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();

        let manager = open_at(&path, 0).unwrap();
        assert!(manager.hosts().is_empty());
        assert!(!manager.is_dirty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("{DEFAULT_HEADER}\n{DEFAULT_TRAILER}\n")
        );
    }

    #[test]
    fn add_host_merges_into_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(
            &path,
            format!("{DEFAULT_HEADER}\n10.0.0.5 foo bar # 1700000000.0\n{DEFAULT_TRAILER}\n"),
        )
        .unwrap();

        let mut manager = open_at(&path, 1_800_000_000).unwrap();
        manager.add_host("10.0.0.5", ["baz"]).unwrap();

        assert_eq!(manager.hosts().len(), 1);
        let record = manager.hosts().iter().next().unwrap();
        assert_eq!(record.names(), ["foo", "bar", "baz"]);
        assert_eq!(record.last_modified().timestamp(), 1_800_000_000);
        assert!(manager.is_dirty());
    }

    #[test]
    fn add_host_with_known_names_stays_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(
            &path,
            format!("{DEFAULT_HEADER}\n10.0.0.5 foo # 1700000000.0\n{DEFAULT_TRAILER}\n"),
        )
        .unwrap();

        let mut manager = open_at(&path, 1_800_000_000).unwrap();
        manager.add_host("10.0.0.5", ["foo"]).unwrap();
        assert!(!manager.is_dirty());
        assert_eq!(
            manager.hosts().iter().next().unwrap().last_modified().timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn add_host_validates_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();
        let mut manager = open_at(&path, 0).unwrap();

        assert!(matches!(
            manager.add_host("fe80::1", ["a"]),
            Err(HostsError::InvalidAddress(_))
        ));
        assert!(matches!(
            manager.add_host("10.0.0.1", [" "]),
            Err(HostsError::EmptyNameSet(_))
        ));
        assert!(manager.hosts().is_empty());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn remove_operations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();
        let mut manager = open_at(&path, 0).unwrap();

        manager.add_host("10.0.0.1", ["a", "b"]).unwrap();
        manager.remove_name("10.0.0.1", "a").unwrap();
        assert!(matches!(
            manager.remove_name("10.0.0.1", "b"),
            Err(HostsError::LastNameRemoval { .. })
        ));
        assert!(matches!(
            manager.remove_name("10.0.0.2", "b"),
            Err(HostsError::NotFound(_))
        ));

        let removed = manager.remove_host("10.0.0.1").unwrap();
        assert_eq!(removed.names(), ["b"]);
        assert!(matches!(
            manager.remove_host("10.0.0.1"),
            Err(HostsError::NotFound(_))
        ));
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();
        let mut manager = open_at(&path, 0).unwrap();

        manager.add_host("10.0.0.1", ["a"]).unwrap();
        manager.reload().unwrap();
        assert!(manager.hosts().is_empty());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn explicit_path_skips_platform_detection() {
        let config = ManagerConfig::new().with_path("/some/where/hosts");
        assert_eq!(
            resolve_path(&config).unwrap(),
            PathBuf::from("/some/where/hosts")
        );
    }
}
