use crate::Naslinks;
use crate::error::Result;
use futures::{StreamExt, stream};
use naslink_fingerprint::{Integrity, check};
use naslink_registry::Link;
use tracing::instrument;

// Checks are I/O bound: a few in flight keeps spinning disks busy without
// thrashing them.
const CHECK_CONCURRENCY: usize = 4;

/// A link that failed its integrity check during [`Naslinks::clean`].
#[derive(Debug, Clone)]
pub struct Removal {
    pub link: Link,
    pub integrity: Integrity,
}

/// Summary of a [`Naslinks::clean`] pass.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Number of links inspected.
    pub checked: usize,
    /// Links that failed and were deleted (or would have been, on a dry run).
    pub removed: Vec<Removal>,
}

impl Naslinks {
    /// Verify every registered link and delete the ones whose file is
    /// missing or altered.
    ///
    /// The batch counterpart of the check done on every download, so stale
    /// links get pruned even if nobody ever requests them.
    #[instrument(skip(self))]
    pub async fn clean(&self) -> Result<CleanReport> {
        let links = self.enumerate().await?;
        let checked = links.len();
        let mut results = stream::iter(links)
            .map(|link| async move {
                let integrity = check(&link.path, &link.fingerprint, link.size).await;
                (link, integrity)
            })
            .buffer_unordered(CHECK_CONCURRENCY);

        let mut removed = Vec::new();
        while let Some((link, integrity)) = results.next().await {
            if integrity.is_intact() {
                tracing::debug!(id = %link.id, path = %link.path.display(), "Naslink passed integrity check");
                continue;
            }
            tracing::warn!(
                id = %link.id,
                path = %link.path.display(),
                reason = ?integrity,
                "File failed integrity check"
            );
            self.retire(&link).await?;
            removed.push(Removal { link, integrity });
        }
        tracing::info!(checked, removed = removed.len(), "Finished cleaning naslinks");
        Ok(CleanReport { checked, removed })
    }
}
