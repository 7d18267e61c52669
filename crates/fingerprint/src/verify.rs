use crate::Fingerprint;
use crate::hasher::fingerprint_sized;
use std::path::Path;
use tokio::fs;
use tracing::instrument;

/// Outcome of re-inspecting a file against its recorded size and fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// Size and fingerprint both match what's on record.
    Intact,
    /// The file could not be stat'd: deleted, moved, or no longer permitted.
    Missing,
    /// Something other than a regular file now lives at the path.
    NotAFile,
    /// The size changed. Hashing was skipped.
    SizeMismatch { recorded: u64, live: u64 },
    /// The size still matches, but the content doesn't.
    FingerprintMismatch,
    /// The file was measured but reading it for hashing failed.
    Unreadable,
}
impl Integrity {
    pub fn is_intact(&self) -> bool {
        matches!(self, Self::Intact)
    }
}

/// Check the live file at `path` against a recorded fingerprint and size.
///
/// The size comparison happens first so a truncated or appended file never
/// pays for hashing. Every failure mode is folded into a non-intact result;
/// this function never errors.
#[instrument(level = "debug", skip(expected), fields(path = %path.as_ref().display()))]
pub async fn check(path: impl AsRef<Path>, expected: &Fingerprint, recorded_size: u64) -> Integrity {
    let path = path.as_ref();
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(_) => return Integrity::Missing,
    };
    if !metadata.is_file() {
        return Integrity::NotAFile;
    }
    let live = metadata.len();
    if live != recorded_size {
        return Integrity::SizeMismatch { recorded: recorded_size, live };
    }
    match fingerprint_sized(path, live).await {
        Ok(actual) if &actual == expected => Integrity::Intact,
        Ok(_) => Integrity::FingerprintMismatch,
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to hash file during integrity check");
            Integrity::Unreadable
        },
    }
}

/// Boolean form of [`check`].
pub async fn verify(path: impl AsRef<Path>, expected: &Fingerprint, recorded_size: u64) -> bool {
    check(path, expected, recorded_size).await.is_intact()
}
