use naslink_fingerprint::Fingerprint;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::UtcDateTime;
use uuid::Uuid;

/// Public handle for a registered file.
///
/// A random (v4) UUID, so 122 bits of it are unguessable. Rendered in the
/// usual lowercase hyphenated form, which is also what's stored and what
/// appears in download URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(Uuid);
impl LinkId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}
impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}
impl FromStr for LinkId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered file, as recorded at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    /// Canonical, absolute path of the file.
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
    /// Size in bytes when the file was registered.
    pub size: u64,
    pub created_at: UtcDateTime,
}
impl Link {
    pub fn new(path: impl Into<PathBuf>, fingerprint: Fingerprint, size: u64) -> Self {
        Self {
            id: LinkId::generate(),
            path: path.into(),
            fingerprint,
            size,
            created_at: UtcDateTime::now(),
        }
    }

    /// Name offered to downloaders: the last component of the stored path.
    pub fn filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}
impl AsRef<Path> for Link {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
