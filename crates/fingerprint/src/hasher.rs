use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::SeekFrom;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::instrument;

const MEBIBYTE: u64 = 1024 * 1024;
/// Files up to (and including) this size are hashed in their entirety.
pub const FULL_HASH_LIMIT: u64 = 16 * MEBIBYTE;
/// Size of each of the three windows sampled from files over [`FULL_HASH_LIMIT`].
pub const SAMPLE_WINDOW: u64 = MEBIBYTE;

/// SHA-256 digest of a file's content (or of its sampled windows).
///
/// Rendered and parsed as 64 lowercase hex characters, which is also how it's
/// persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);
impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
impl FromStr for Fingerprint {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes).or_raise(|| ErrorKind::InvalidFingerprint(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Which bytes of a file contribute to its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// The whole file.
    Full,
    /// [`SAMPLE_WINDOW`] bytes starting at each offset, hashed in order.
    Windows([u64; 3]),
}
impl Sampling {
    pub fn for_size(size: u64) -> Self {
        if size <= FULL_HASH_LIMIT {
            return Self::Full;
        }
        Self::Windows([0, size / 2, size - SAMPLE_WINDOW])
    }
}

/// Size and fingerprint of a file, taken from the same stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub size: u64,
    pub fingerprint: Fingerprint,
}

/// Measure the file at `path` and compute its fingerprint.
///
/// The size decides the [`Sampling`]. Fails if the file can't be stat'd or
/// read, isn't a regular file, or if any sampled window comes back short.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn measure(path: impl AsRef<Path>) -> Result<Measurement> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    if !metadata.is_file() {
        exn::bail!(ErrorKind::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len();
    let fingerprint = fingerprint_sized(path, size).await?;
    Ok(Measurement { size, fingerprint })
}

/// Compute the fingerprint of the file at `path`. See [`measure`].
pub async fn fingerprint(path: impl AsRef<Path>) -> Result<Fingerprint> {
    Ok(measure(path).await?.fingerprint)
}

/// Fingerprint a file whose size has already been measured by the caller.
pub(crate) async fn fingerprint_sized(path: &Path, size: u64) -> Result<Fingerprint> {
    let mut hasher = Sha256::new();
    match Sampling::for_size(size) {
        Sampling::Full => {
            let bytes = fs::read(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
            hasher.update(&bytes);
        },
        Sampling::Windows(offsets) => {
            let mut file = fs::File::open(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
            // Window size is a small constant, the cast can't truncate.
            let mut window = vec![0u8; SAMPLE_WINDOW as usize];
            for offset in offsets {
                file.seek(SeekFrom::Start(offset)).await.map_err(|e| ErrorKind::from_io(e, path))?;
                file.read_exact(&mut window).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::UnexpectedEof => ErrorKind::ShortRead { path: path.to_path_buf(), offset },
                    _ => ErrorKind::from_io(e, path),
                })?;
                hasher.update(&window);
            }
        },
    }
    let digest: [u8; 32] = hasher.finalize().into();
    Ok(Fingerprint(digest))
}
