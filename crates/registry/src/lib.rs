//! SQLite registry of naslinks.
//!
//! Every registered file gets exactly one row: a random identifier, the
//! canonical path it points at, and the size and fingerprint the file had
//! when it was registered. Unlike a cache, this database *is* the source of
//! truth; delete it and every link handed out so far stops working.
//!
//! All access goes through single-statement queries. There's no
//! read-decide-write transaction anywhere, so two callers racing on the same
//! identifier can at worst both try to delete it.

mod db;
pub mod error;
mod link;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::link::{Link, LinkId};
pub use crate::repo::Repository;
