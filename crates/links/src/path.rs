//! Path resolution.
//!
//! Links are keyed by canonical path, so `./a.txt`, `/srv/share/a.txt` and a
//! symlink pointing at it all end up as the same record.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Resolve an existing file to its canonical, absolute path.
pub(crate) async fn canonicalize(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).await.or_raise(|| ErrorKind::Path(path.to_path_buf()))
}

/// Resolve a path that may no longer exist.
///
/// Deleting the link of a file that's already gone must still find the
/// record, so when the file itself is missing this falls back to
/// canonicalizing its parent directory, and failing that to a purely lexical
/// absolute path.
pub(crate) async fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path).await {
        Ok(canonical) => return Ok(canonical),
        Err(e) if e.kind() == IoErrorKind::NotFound => {},
        Err(e) => return Err(e).or_raise(|| ErrorKind::Path(path.to_path_buf())),
    }
    let absolute = absolute(path)?;
    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name())
        && let Ok(parent) = fs::canonicalize(parent).await
    {
        return Ok(parent.join(name));
    }
    Ok(absolute)
}

/// Make `path` absolute against the working directory and lexically resolve
/// `.` and `..` components. Never touches the filesystem beyond reading the
/// working directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = std::path::absolute(path).or_raise(|| ErrorKind::Path(path.to_path_buf()))?;
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => normalized.push(component),
            Component::CurDir => {},
            // Popping at the root is a no-op, same as the kernel treats `/..`.
            Component::ParentDir => {
                normalized.pop();
            },
        }
    }
    Ok(normalized)
}
