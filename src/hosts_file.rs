//! Whole-file line I/O on the hosts file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HostsError, Result};

/// How [`HostsFile::write_lines`] treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Add lines after the existing bytes, which are left as they are.
    Append,
    /// Rewrite the whole file.
    Replace,
}

/// A text file read and written as a sequence of lines.
///
/// Lines keep their own terminators (`\n`, `\r\n`, or none for an
/// unterminated last line) and are written back verbatim, so lines that are
/// read and rewritten keep their exact bytes.
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    /// Wraps `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The wrapped path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty file if either is missing.
    ///
    /// Existing content is never truncated.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`] on failure.
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(())
    }

    /// Reads every line of the file, terminators included.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`] if the file cannot be read, or
    /// [`HostsError::NotUtf8`] if it is not UTF-8.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let bytes = std::fs::read(&self.path)?;
        let content = String::from_utf8(bytes).map_err(|source| HostsError::NotUtf8 {
            path: self.path.clone(),
            source,
        })?;
        Ok(content.split_inclusive('\n').map(String::from).collect())
    }

    /// Writes `lines` verbatim in the given mode.
    ///
    /// Callers supply terminators. In [`WriteMode::Append`] a line break
    /// matching the file's style is written first when the file ends with an
    /// unterminated line, so the new lines never merge into it.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`] on failure.
    pub fn write_lines<S: AsRef<str>>(&self, lines: &[S], mode: WriteMode) -> Result<()> {
        let mut buf = String::new();
        if mode == WriteMode::Append {
            let existing = match self.read_lines() {
                Ok(existing) => existing,
                Err(HostsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(e) => return Err(e),
            };
            if existing.last().is_some_and(|l| !l.ends_with('\n')) {
                buf.push_str(line_ending(&existing));
            }
        }
        for line in lines {
            buf.push_str(line.as_ref());
        }

        match mode {
            WriteMode::Append => {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                file.write_all(buf.as_bytes())?;
                file.flush()?;
            }
            WriteMode::Replace => std::fs::write(&self.path, buf)?,
        }

        tracing::debug!(
            path = %self.path.display(),
            lines = lines.len(),
            ?mode,
            "Wrote hosts file lines"
        );
        Ok(())
    }
}

/// The terminator of the first terminated line, `\n` if there is none.
#[must_use]
pub fn line_ending<S: AsRef<str>>(lines: &[S]) -> &'static str {
    lines
        .iter()
        .map(AsRef::as_ref)
        .find(|l| l.ends_with('\n'))
        .map_or("\n", |l| if l.ends_with("\r\n") { "\r\n" } else { "\n" })
}
