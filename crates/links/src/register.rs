use crate::Naslinks;
use crate::error::{ErrorKind, Result};
use crate::path::{canonicalize, canonicalize_lenient};
use exn::ResultExt;
use naslink_fingerprint::measure;
use naslink_registry::{Link, LinkId};
use std::path::Path;
use tracing::instrument;

impl Naslinks {
    /// Register the file at `path` under a freshly minted identifier.
    ///
    /// The path is canonicalized first, so it must exist. If the file is
    /// already linked, the old link is retired and its identifier stops
    /// working. The file is measured before anything is retired, so a file
    /// that can't be hashed leaves the existing link alone.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn create(&self, path: impl AsRef<Path>) -> Result<Link> {
        let path = canonicalize(path.as_ref()).await?;
        let measurement = measure(&path).await.or_raise(|| ErrorKind::Fingerprint(path.clone()))?;
        if let Some(existing) = self.repo.get_by_path(&path).await.or_raise(|| ErrorKind::Registry)? {
            tracing::info!(
                path = %path.display(),
                id = %existing.id,
                "File already has a naslink; overwriting this record"
            );
            self.retire(&existing).await?;
        }
        let link = Link::new(path, measurement.fingerprint, measurement.size);
        self.repo.insert(&link).await.or_raise(|| ErrorKind::Registry)?;
        tracing::info!(path = %link.path.display(), id = %link.id, size = link.size, "Created naslink");
        Ok(link)
    }

    /// Look up a link by its public identifier. No integrity check.
    pub async fn lookup(&self, identifier: impl AsRef<str>) -> Result<Option<Link>> {
        self.repo.get_by_identifier(identifier).await.or_raise(|| ErrorKind::Registry)
    }

    /// Identifier of the link registered for `path`, if any.
    ///
    /// Works for files that have since been deleted from disk.
    pub async fn find_by_path(&self, path: impl AsRef<Path>) -> Result<Option<LinkId>> {
        let path = canonicalize_lenient(path.as_ref()).await?;
        let link = self.repo.get_by_path(&path).await.or_raise(|| ErrorKind::Registry)?;
        Ok(link.map(|link| link.id))
    }

    /// Remove the link registered for `path`.
    ///
    /// Returns the removed link, or `None` if the path never had one (which
    /// is not an error).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<Option<Link>> {
        let path = canonicalize_lenient(path.as_ref()).await?;
        let Some(link) = self.repo.get_by_path(&path).await.or_raise(|| ErrorKind::Registry)? else {
            tracing::info!(path = %path.display(), "File does not have a naslink");
            return Ok(None);
        };
        self.retire(&link).await?;
        tracing::info!(path = %link.path.display(), id = %link.id, "Removed naslink");
        Ok(Some(link))
    }

    /// Every registered link, oldest first.
    pub async fn enumerate(&self) -> Result<Vec<Link>> {
        self.repo.list().await.or_raise(|| ErrorKind::Registry)
    }

    /// Delete a specific record. A record that's already gone is fine; a
    /// concurrent request may have invalidated it first.
    pub(crate) async fn retire(&self, link: &Link) -> Result<()> {
        let deleted = self.repo.delete_by_identifier(link.id.to_string()).await.or_raise(|| ErrorKind::Registry)?;
        if !deleted {
            tracing::debug!(id = %link.id, "Naslink was already removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Naslinks;
    use crate::error::ErrorKind;
    use naslink_registry::Database;
    use std::fs;

    async fn naslinks() -> Naslinks {
        let db = Database::connect_in_memory().await.unwrap();
        Naslinks::from(&db)
    }

    #[tokio::test]
    async fn test_create_records_canonical_path_size_and_fingerprint() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"0123456789").unwrap();
        let link = links.create(dir.path().join("./notes.txt")).await.unwrap();
        assert_eq!(link.path, fs::canonicalize(&path).unwrap());
        assert_eq!(link.size, 10);
        assert_eq!(
            link.fingerprint.to_string(),
            "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882"
        );
        let stored = links.lookup(link.id.to_string()).await.unwrap().unwrap();
        assert_eq!(stored.path, link.path);
        assert_eq!(stored.fingerprint, link.fingerprint);
        assert_eq!(stored.size, link.size);
    }

    #[tokio::test]
    async fn test_create_missing_file_fails() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let err = links.create(dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Path(_)));
        assert!(links.enumerate().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_directory_fails() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let err = links.create(dir.path()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fingerprint(_)));
    }

    #[tokio::test]
    async fn test_recreate_supersedes_previous_link() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"0123456789").unwrap();
        let first = links.create(&path).await.unwrap();
        let second = links.create(&path).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(links.lookup(first.id.to_string()).await.unwrap().is_none());
        let all = links.enumerate().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, second.id);
        assert_eq!(links.find_by_path(&path).await.unwrap(), Some(second.id));
    }

    #[tokio::test]
    async fn test_delete_removes_link() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"0123456789").unwrap();
        let link = links.create(&path).await.unwrap();
        let removed = links.delete(&path).await.unwrap().unwrap();
        assert_eq!(removed.id, link.id);
        assert!(links.lookup(link.id.to_string()).await.unwrap().is_none());
        assert!(links.find_by_path(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unregistered_path_is_noop() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-linked.txt");
        assert!(links.delete(&path).await.unwrap().is_none());
        fs::write(&path, b"exists, but unlinked").unwrap();
        assert!(links.delete(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_after_file_vanished() {
        let links = naslinks().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"0123456789").unwrap();
        let link = links.create(&path).await.unwrap();
        fs::remove_file(&path).unwrap();
        let removed = links.delete(&path).await.unwrap().unwrap();
        assert_eq!(removed.id, link.id);
        assert!(links.enumerate().await.unwrap().is_empty());
    }
}
