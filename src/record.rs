//! A single managed host entry.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, SubsecRound, Utc};

use crate::clock::Clock;
use crate::error::{HostsError, Result};

/// One IPv4 address, the names that resolve to it, and when it last changed.
///
/// On disk a record is one line of the managed section:
///
/// ```text
/// 10.0.0.5 foo bar # 1700000000.0
/// ```
///
/// # Example
///
/// ```
/// use hosts_manager::HostRecord;
///
/// let record = HostRecord::parse("10.0.0.5 foo bar # 1700000000.0").unwrap();
/// assert_eq!(record.address().to_string(), "10.0.0.5");
/// assert_eq!(record.names(), ["foo", "bar"]);
/// assert_eq!(record.last_modified().timestamp(), 1_700_000_000);
/// assert_eq!(record.serialize(), "10.0.0.5 foo bar # 1700000000.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    address: Ipv4Addr,
    names: Vec<String>,
    last_modified: DateTime<Utc>,
}

impl HostRecord {
    /// Creates a record from an already-parsed address.
    ///
    /// Names are trimmed, blank names are dropped and duplicates collapse to
    /// their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidName`] if a name contains whitespace or
    /// `#`, or [`HostsError::EmptyNameSet`] if no names remain.
    pub fn new<I, S>(address: Ipv4Addr, names: I, last_modified: DateTime<Utc>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self {
            address,
            names: Vec::new(),
            last_modified: last_modified.trunc_subsecs(0),
        };
        for name in normalize_names(names)? {
            record.push_name(name);
        }
        if record.names.is_empty() {
            return Err(HostsError::EmptyNameSet(address));
        }
        Ok(record)
    }

    /// Creates a record from address text.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidAddress`] if `address` is not a
    /// dotted-quad IPv4 address, otherwise as [`HostRecord::new`].
    pub fn create<I, S>(address: &str, names: I, last_modified: DateTime<Utc>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(parse_address(address)?, names, last_modified)
    }

    /// Parses one managed-section line.
    ///
    /// Everything before the first `#` is the address followed by names;
    /// everything after it is the epoch-seconds timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::MalformedLine`] if the address is not IPv4,
    /// there are no names, or the timestamp comment is missing or not a
    /// number.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some((fields, comment)) = line.split_once('#') else {
            return Err(HostsError::malformed(line, "missing timestamp comment"));
        };

        let mut tokens = fields.split_whitespace();
        let Some(address) = tokens.next() else {
            return Err(HostsError::malformed(line, "missing address"));
        };
        let address: Ipv4Addr = address
            .parse()
            .map_err(|_| HostsError::malformed(line, format!("invalid IPv4 address {address:?}")))?;

        let last_modified = parse_epoch_secs(comment.trim()).ok_or_else(|| {
            HostsError::malformed(line, format!("invalid timestamp {:?}", comment.trim()))
        })?;

        Self::new(address, tokens, last_modified).map_err(|e| match e {
            HostsError::EmptyNameSet(_) => HostsError::malformed(line, "no host names"),
            other => other,
        })
    }

    /// Renders the on-disk line form, `<address> <names...> # <epoch>.0`.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{} {} # {}.0",
            self.address,
            self.names.join(" "),
            self.last_modified.timestamp()
        )
    }

    /// The record's address.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Names in first-insertion order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// When the name set last changed.
    #[must_use]
    pub const fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Returns `true` if `name` resolves to this record.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Merges `names` into the record.
    ///
    /// The timestamp is refreshed from `clock` only when at least one name is
    /// new; merging names that are all present already is a no-op. Returns
    /// whether the record changed.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidName`] if a name contains whitespace or
    /// `#`. The record is unchanged on error.
    pub fn add_names<I, S>(&mut self, names: I, clock: &dyn Clock) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.names.len();
        for name in normalize_names(names)? {
            self.push_name(name);
        }
        if self.names.len() == before {
            return Ok(false);
        }
        self.last_modified = clock.now().trunc_subsecs(0);
        Ok(true)
    }

    /// Removes a single name.
    ///
    /// The timestamp is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::NotFound`] if the record has no such name, or
    /// [`HostsError::LastNameRemoval`] if it is the only name left.
    pub fn remove_name(&mut self, name: &str) -> Result<()> {
        let Some(index) = self.names.iter().position(|n| n == name) else {
            return Err(HostsError::NotFound(format!("name {name:?} on host {}", self.address)));
        };
        if self.names.len() == 1 {
            return Err(HostsError::LastNameRemoval {
                address: self.address,
                name: name.to_string(),
            });
        }
        self.names.remove(index);
        Ok(())
    }

    fn push_name(&mut self, name: String) {
        if !self.has_name(&name) {
            self.names.push(name);
        }
    }
}

/// Human-readable form with a calendar date. Display only; never parsed.
impl fmt::Display for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} # {}",
            self.address,
            self.names.join(" "),
            self.last_modified.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Parses dotted-quad IPv4 text.
///
/// # Errors
///
/// Returns [`HostsError::InvalidAddress`] for anything else, IPv6 included.
pub fn parse_address(text: &str) -> Result<Ipv4Addr> {
    text.trim()
        .parse()
        .map_err(|_| HostsError::InvalidAddress(text.to_string()))
}

fn normalize_names<I, S>(names: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if name.contains(|c: char| c.is_whitespace() || c == '#') {
            return Err(HostsError::InvalidName(name.to_string()));
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Accepts whole or fractional epoch seconds; fractions are dropped.
fn parse_epoch_secs(text: &str) -> Option<DateTime<Utc>> {
    let secs = match text.parse::<i64>() {
        Ok(secs) => secs,
        Err(_) => floor_secs(text.parse::<f64>().ok().filter(|v| v.is_finite())?),
    };
    DateTime::from_timestamp(secs, 0)
}

/// Saturating cast; out-of-range values are rejected by the caller.
#[allow(clippy::cast_possible_truncation)]
fn floor_secs(value: f64) -> i64 {
    value.floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn parse_reference_line() {
        let r = HostRecord::parse("10.0.0.5 foo bar # 1700000000.0").unwrap();
        assert_eq!(r.address(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(r.names(), ["foo", "bar"]);
        assert_eq!(r.last_modified(), at(1_700_000_000));
    }

    #[test]
    fn parse_accepts_integer_and_microsecond_timestamps() {
        let r = HostRecord::parse("127.0.0.2 a # 1700000000").unwrap();
        assert_eq!(r.last_modified(), at(1_700_000_000));

        let r = HostRecord::parse("127.0.0.2 a # 1700000000.654321\n").unwrap();
        assert_eq!(r.last_modified(), at(1_700_000_000));
    }

    #[test]
    fn parse_tolerates_extra_whitespace_and_crlf() {
        let r = HostRecord::parse("  192.168.1.10\tdb   cache #   1700000000.0 \r\n").unwrap();
        assert_eq!(r.address(), Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(r.names(), ["db", "cache"]);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        for line in [
            "10.0.0.5 foo bar",
            "10.0.0.5 # 1700000000.0",
            "not-an-ip foo # 1700000000.0",
            "::1 foo # 1700000000.0",
            "10.0.0.256 foo # 1700000000.0",
            "10.0.0.5 foo # yesterday",
            "10.0.0.5 foo #",
            "10.0.0.5 foo # NaN",
            "# 1700000000.0",
            "",
        ] {
            let err = HostRecord::parse(line).unwrap_err();
            assert!(
                matches!(err, HostsError::MalformedLine { .. }),
                "{line:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn out_of_range_timestamps_are_malformed() {
        for line in ["10.0.0.5 foo # 1e30", "10.0.0.5 foo # -1e30", "10.0.0.5 foo # inf"] {
            assert!(matches!(
                HostRecord::parse(line),
                Err(HostsError::MalformedLine { .. })
            ));
        }
        let r = HostRecord::parse("10.0.0.5 foo # -0.5").unwrap();
        assert_eq!(r.last_modified(), at(-1));
    }

    #[test]
    fn serialize_round_trips() {
        let r = HostRecord::create("172.16.0.1", ["web", "api.local"], at(1_650_000_123)).unwrap();
        let line = r.serialize();
        assert_eq!(line, "172.16.0.1 web api.local # 1650000123.0");
        assert_eq!(HostRecord::parse(&line).unwrap(), r);
    }

    #[test]
    fn subseconds_are_truncated_on_construction() {
        let ts = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        let r = HostRecord::create("10.0.0.1", ["a"], ts).unwrap();
        assert_eq!(r.last_modified(), at(1_700_000_000));
        assert_eq!(HostRecord::parse(&r.serialize()).unwrap(), r);
    }

    #[test]
    fn create_validates_input() {
        assert!(matches!(
            HostRecord::create("10.0.0", ["a"], at(0)),
            Err(HostsError::InvalidAddress(_))
        ));
        assert!(matches!(
            HostRecord::create("10.0.0.1", Vec::<String>::new(), at(0)),
            Err(HostsError::EmptyNameSet(_))
        ));
        assert!(matches!(
            HostRecord::create("10.0.0.1", ["", "  "], at(0)),
            Err(HostsError::EmptyNameSet(_))
        ));
        assert!(matches!(
            HostRecord::create("10.0.0.1", ["bad#name"], at(0)),
            Err(HostsError::InvalidName(_))
        ));
    }

    #[test]
    fn duplicate_names_collapse() {
        let r = HostRecord::create("10.0.0.1", ["a", "b", "a"], at(0)).unwrap();
        assert_eq!(r.names(), ["a", "b"]);
    }

    #[test]
    fn add_names_refreshes_timestamp_once() {
        let mut r = HostRecord::create("10.0.0.5", ["foo", "bar"], at(100)).unwrap();
        let clock = FixedClock::from_epoch_secs(200);

        assert!(r.add_names(["baz"], &clock).unwrap());
        assert_eq!(r.names(), ["foo", "bar", "baz"]);
        assert_eq!(r.last_modified(), at(200));

        let later = FixedClock::from_epoch_secs(300);
        assert!(!r.add_names(["baz"], &later).unwrap());
        assert!(!r.add_names(["bar", "foo"], &later).unwrap());
        assert_eq!(r.last_modified(), at(200));
    }

    #[test]
    fn add_names_rejects_invalid_without_change() {
        let mut r = HostRecord::create("10.0.0.5", ["foo"], at(100)).unwrap();
        let clock = FixedClock::from_epoch_secs(200);
        assert!(r.add_names(["ok", "not ok"], &clock).is_err());
        assert_eq!(r.names(), ["foo"]);
        assert_eq!(r.last_modified(), at(100));
    }

    #[test]
    fn remove_name_keeps_timestamp_and_last_name() {
        let mut r = HostRecord::create("10.0.0.5", ["foo", "bar"], at(100)).unwrap();
        r.remove_name("foo").unwrap();
        assert_eq!(r.names(), ["bar"]);
        assert_eq!(r.last_modified(), at(100));

        assert!(matches!(
            r.remove_name("bar"),
            Err(HostsError::LastNameRemoval { .. })
        ));
        assert!(matches!(r.remove_name("nope"), Err(HostsError::NotFound(_))));
        assert_eq!(r.names(), ["bar"]);
    }

    #[test]
    fn display_uses_calendar_date() {
        let r = HostRecord::create("10.0.0.5", ["foo"], at(1_700_000_000)).unwrap();
        assert_eq!(r.to_string(), "10.0.0.5 foo # 2023-11-14 22:13:20");
    }
}
