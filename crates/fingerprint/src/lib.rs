//! Content fingerprints for linked files.
//!
//! A [`Fingerprint`] is a SHA-256 digest of a file. Small files are hashed in
//! full; large files are hashed from three fixed-size windows (head, middle
//! and tail) so that re-verifying a multi-gigabyte video doesn't mean reading
//! the whole thing every time someone clicks a link. Changes confined to the
//! bytes between those windows go unnoticed, and that's the price.
//!
//! [`check`] re-inspects a file against what was recorded at registration
//! time. Nothing is cached: every call goes back to the filesystem.

pub mod error;
mod hasher;
mod verify;

pub use crate::hasher::{FULL_HASH_LIMIT, Fingerprint, Measurement, SAMPLE_WINDOW, Sampling, fingerprint, measure};
pub use crate::verify::{Integrity, check, verify};
