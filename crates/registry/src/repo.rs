//! Repository for [`Link`] records.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::link::Link;
use crate::models::LinkRow;
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use std::path::Path;

/// Point queries and single-row writes against the `links` table.
///
/// Paths are expected to already be canonical; the repository compares them
/// byte-for-byte and does no filesystem access of its own.
///
/// With `dry_run` enabled, every write reports what it *would* have done
/// without touching the database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn sqlx_hates_paths(path: impl AsRef<Path>) -> Result<String> {
        Ok(path.as_ref().to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string())
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Persist a new link.
    ///
    /// Fails with [`ErrorKind::Database`] if the identifier or the path is
    /// already taken; superseding an existing link is the caller's job.
    pub async fn insert(&self, link: &Link) -> Result<()> {
        let row = LinkRow::try_from(link)?;
        if self.dry_run {
            return Ok(());
        }
        sqlx::query(include_str!("../queries/insert_link.sql"))
            .bind(row.identifier)
            .bind(row.path)
            .bind(row.fingerprint)
            .bind(row.size)
            .bind(row.created_at)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get a link by its public identifier.
    ///
    /// The identifier is matched verbatim, so anything that isn't a stored
    /// identifier (including malformed input) is simply absent.
    pub async fn get_by_identifier(&self, identifier: impl AsRef<str>) -> Result<Option<Link>> {
        let row: Option<LinkRow> = sqlx::query_as(include_str!("../queries/get_by_identifier.sql"))
            .bind(identifier.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Link::try_from).transpose()
    }

    /// Get the link registered for a canonical path.
    pub async fn get_by_path(&self, path: impl AsRef<Path>) -> Result<Option<Link>> {
        let row: Option<LinkRow> = sqlx::query_as(include_str!("../queries/get_by_path.sql"))
            .bind(Self::sqlx_hates_paths(path)?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Link::try_from).transpose()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every link, oldest first.
    pub async fn list(&self) -> Result<Vec<Link>> {
        let rows: Vec<LinkRow> = sqlx::query_as(include_str!("../queries/list_links.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Link::try_from).collect()
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a link by identifier.
    ///
    /// Returns `true` if a record was deleted, `false` if there was nothing
    /// to delete (possibly because a concurrent request got there first).
    pub async fn delete_by_identifier(&self, identifier: impl AsRef<str>) -> Result<bool> {
        if self.dry_run {
            return Ok(self.get_by_identifier(identifier).await?.is_some());
        }
        let result = sqlx::query(include_str!("../queries/delete_by_identifier.sql"))
            .bind(identifier.as_ref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
