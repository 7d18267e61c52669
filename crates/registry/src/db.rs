//! Opening the registry database.
//!
//! A single SQLite file holds every link. The server and the CLI commands
//! open it independently, possibly at the same time, which is why it runs in
//! WAL mode with a busy timeout: an `add` from a shell never blocks downloads
//! for longer than one short write.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Where the registry lives.
#[derive(Debug, Clone, Copy)]
enum Location<'a> {
    File(&'a Path),
    /// Private to a single connection; gone once the pool closes.
    Memory,
}

/// Connection pool over the registry database, migrated and ready to use.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the registry at `path`, creating the file on first use.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Location::File(path.as_ref())).await
    }

    /// Open a throwaway registry that lives only as long as the pool.
    ///
    /// Deliberately available outside `#[cfg(test)]`: the crates above this
    /// one build their test fixtures on it.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(Location::Memory).await
    }

    async fn open(location: Location<'_>) -> Result<Self> {
        let (options, max_connections) = match location {
            Location::File(path) => (Self::options().filename(path).create_if_missing(true), MAX_CONNECTIONS),
            // A second connection to ":memory:" would be a second, empty database.
            Location::Memory => (Self::options().filename(":memory:"), 1),
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        tracing::debug!(?location, "Registry database ready");
        Ok(Self { pool })
    }

    /// Settings applied to every connection the pool opens.
    fn options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", "-2048")
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Let SQLite refresh its planner statistics, then close every connection.
    /// Don't use the instance afterwards.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
