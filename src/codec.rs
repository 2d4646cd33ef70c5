//! Managed section encoding and decoding.

use std::ops::Range;

use crate::error::Result;
use crate::record::HostRecord;
use crate::registry::HostRegistry;
use crate::section::Markers;

/// Decodes section body lines into a registry.
///
/// Blank lines are skipped. `first_line` is the 1-based file line number of
/// `body[0]`, used in error messages.
///
/// # Errors
///
/// Fails on the first line that does not parse
/// ([`HostsError::MalformedLine`](crate::HostsError::MalformedLine)) or
/// repeats an address
/// ([`HostsError::DuplicateAddress`](crate::HostsError::DuplicateAddress)).
/// No partial registry is returned.
pub fn decode<S: AsRef<str>>(body: &[S], first_line: usize) -> Result<HostRegistry> {
    let mut registry = HostRegistry::new();
    for (offset, line) in body.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let record = HostRecord::parse(line).map_err(|e| e.at_line(first_line + offset))?;
        registry.insert(record)?;
    }
    Ok(registry)
}

/// Encodes the whole section: header, one line per record, trailer.
#[must_use]
pub fn encode(registry: &HostRegistry, markers: &Markers) -> Vec<String> {
    let mut lines = Vec::with_capacity(registry.len() + 2);
    lines.push(markers.header().to_string());
    lines.extend(registry.serialize_all());
    lines.push(markers.trailer().to_string());
    lines
}

/// Replaces the section around `body` (its header and trailer included) with
/// `section`, leaving every other line untouched.
///
/// `file` lines carry their terminators; `section` lines do not. The new
/// header and record lines take the old header's terminator and the new
/// trailer keeps the old trailer's, so an unchanged section is rewritten
/// byte for byte.
#[must_use]
pub fn splice(file: &[String], body: Range<usize>, section: Vec<String>) -> Vec<String> {
    let header = body.start - 1;
    let trailer = body.end;
    let eol = terminator(&file[header]);
    let trailer_eol = terminator(&file[trailer]);

    let count = section.len();
    let mut out = Vec::with_capacity(file.len() - (trailer + 1 - header) + count);
    out.extend_from_slice(&file[..header]);
    out.extend(section.into_iter().enumerate().map(|(i, mut line)| {
        line.push_str(if i + 1 == count { trailer_eol } else { eol });
        line
    }));
    out.extend_from_slice(&file[trailer + 1..]);
    out
}

fn terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}
