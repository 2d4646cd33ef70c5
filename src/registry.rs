//! Ordered, address-unique collection of host records.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};

use crate::error::{HostsError, Result};
use crate::record::HostRecord;

/// The managed hosts of one file, in first-seen order.
///
/// The backing vector is private: records enter only through
/// [`add`](Self::add), which enforces address uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRegistry {
    records: Vec<HostRecord>,
}

impl HostRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Returns the record for `address`, if any.
    #[must_use]
    pub fn find_by_address(&self, address: Ipv4Addr) -> Option<&HostRecord> {
        self.records.iter().find(|r| r.address() == address)
    }

    pub(crate) fn find_by_address_mut(&mut self, address: Ipv4Addr) -> Option<&mut HostRecord> {
        self.records.iter_mut().find(|r| r.address() == address)
    }

    /// Returns every record carrying `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<&HostRecord> {
        self.records.iter().filter(|r| r.has_name(name)).collect()
    }

    /// Appends a new record.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::DuplicateAddress`] if `address` is already
    /// present, or the validation errors of [`HostRecord::new`]. The
    /// registry is unchanged on error.
    pub fn add<I, S>(
        &mut self,
        address: Ipv4Addr,
        names: I,
        last_modified: DateTime<Utc>,
    ) -> Result<&HostRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(HostRecord::new(address, names, last_modified)?)
    }

    /// Appends an already-built record.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::DuplicateAddress`] if its address is present.
    pub fn insert(&mut self, record: HostRecord) -> Result<&HostRecord> {
        if self.find_by_address(record.address()).is_some() {
            return Err(HostsError::DuplicateAddress(record.address()));
        }
        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Removes and returns the record for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::NotFound`] if there is none.
    pub fn remove_by_address(&mut self, address: Ipv4Addr) -> Result<HostRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.address() == address)
            .ok_or_else(|| HostsError::NotFound(format!("host {address}")))?;
        Ok(self.records.remove(index))
    }

    /// Serialized line of every record, in registry order.
    #[must_use]
    pub fn serialize_all(&self) -> Vec<String> {
        self.records.iter().map(HostRecord::serialize).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, HostRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a HostRegistry {
    type Item = &'a HostRecord;
    type IntoIter = std::slice::Iter<'a, HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
