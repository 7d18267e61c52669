//! Link lifecycle for naslink.
//!
//! [`Naslinks`] ties the registry database to the filesystem: it registers
//! files under fresh identifiers, resolves identifiers for downloads, and
//! deletes any link whose file no longer matches what was recorded. A link
//! that fails its integrity check is gone for good; the operator has to
//! register the file again to get a new one.
//!
//! Every call re-reads the filesystem and the database. Nothing is held in
//! memory between calls, so an `add` from the command line is visible to a
//! running server immediately.

mod clean;
pub mod error;
mod path;
mod register;
mod resolve;

pub use crate::clean::{CleanReport, Removal};
pub use crate::resolve::{Caller, Resolution, normalize_identifier};
pub use naslink_fingerprint::Integrity;
pub use naslink_registry::{Link, LinkId};
use naslink_registry::{Database, Repository};

/// Registry operations plus the integrity rules that guard them.
#[derive(Debug, Clone)]
pub struct Naslinks {
    repo: Repository,
}
impl From<&Database> for Naslinks {
    fn from(db: &Database) -> Self {
        Self { repo: Repository::from(db) }
    }
}
impl From<Repository> for Naslinks {
    fn from(repo: Repository) -> Self {
        Self { repo }
    }
}
impl Naslinks {
    pub fn repository(&self) -> &Repository {
        &self.repo
    }
}
