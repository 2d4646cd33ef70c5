//! # hosts-manager
//!
//! Manage a machine-owned section of the system hosts file.
//!
//! Everything this crate writes lives between two marker lines, so entries
//! maintained by hand or by other tools are never touched:
//!
//! ```text
//! 127.0.0.1 localhost
//!
//! # START HostManager managed hosts, do not edit
//! 10.0.0.5 api.local web.local # 1700000000.0
//! # END of HostManager managed hosts, do not edit
//! ```
//!
//! Each managed line holds an IPv4 address, one or more names and the Unix
//! time it last changed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hosts_manager::{HostsManager, ManagerConfig};
//!
//! // Opens /etc/hosts (or the Windows equivalent); requires write access.
//! let mut hosts = HostsManager::open(ManagerConfig::new())?;
//!
//! hosts.add_host("10.0.0.5", ["api.local"])?;
//! hosts.add_host("10.0.0.5", ["web.local"])?; // merged into the same line
//! hosts.save()?;
//!
//! for record in hosts.find_by_name("api.local") {
//!     println!("{record}");
//! }
//! ```
//!
//! ## Corruption
//!
//! If only one of the two markers is present, or they are out of order,
//! [`HostsManager::open`] fails with a corruption error and leaves the file
//! alone. Nothing is guessed; the file has to be fixed by hand.
//!
//! ## Debugging
//!
//! [`ManagerConfig::with_debug`] switches to a throwaway file
//! (`/tmp/HostsManager/hosts` on Linux, `%TEMP%\HostsManager\hosts` on
//! Windows) that is created on demand.
//!
//! ## Logging
//!
//! Events are emitted through `tracing`; install a subscriber in the
//! application. [`ManagerConfig::with_span`] scopes a manager's events.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod hosts_file;
pub mod manager;
pub mod platform;
pub mod record;
pub mod registry;
pub mod section;
pub mod util;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ManagerConfig;
pub use error::{HostsError, Result};
pub use hosts_file::{HostsFile, WriteMode};
pub use manager::HostsManager;
pub use platform::Platform;
pub use record::HostRecord;
pub use registry::HostRegistry;
pub use section::{Markers, SectionState};
