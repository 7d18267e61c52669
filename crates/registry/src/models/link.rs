use crate::error::{Error, ErrorKind};
use crate::{Link, LinkId};
use exn::{OptionExt, ResultExt};
use naslink_fingerprint::Fingerprint;
use std::path::PathBuf;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub(crate) identifier: String,
    pub(crate) path: String,
    pub(crate) fingerprint: String,
    pub(crate) size: i64,
    pub(crate) created_at: i64,
}
impl TryFrom<&Link> for LinkRow {
    type Error = Error;
    fn try_from(link: &Link) -> Result<Self, Self::Error> {
        Ok(Self {
            identifier: link.id.to_string(),
            path: link.path.to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string(),
            fingerprint: link.fingerprint.to_string(),
            size: i64::try_from(link.size).or_raise(|| ErrorKind::InvalidData("size"))?,
            created_at: link.created_at.unix_timestamp(),
        })
    }
}
impl TryFrom<LinkRow> for Link {
    type Error = Error;
    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.identifier.parse::<LinkId>().or_raise(|| ErrorKind::InvalidData("identifier"))?,
            path: PathBuf::from(row.path),
            fingerprint: row.fingerprint.parse::<Fingerprint>().or_raise(|| ErrorKind::InvalidData("fingerprint"))?,
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("size"))?,
            created_at: UtcDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882";

    fn row() -> LinkRow {
        LinkRow {
            identifier: "1f0e4d6c-3b8a-4c2e-9a61-2d5f7b0c8e14".to_string(),
            path: "/srv/share/notes.txt".to_string(),
            fingerprint: DIGEST.to_string(),
            size: 10,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_row_to_model() {
        let link = Link::try_from(row()).unwrap();
        assert_eq!(link.id.to_string(), "1f0e4d6c-3b8a-4c2e-9a61-2d5f7b0c8e14");
        assert_eq!(link.path, PathBuf::from("/srv/share/notes.txt"));
        assert_eq!(link.fingerprint.to_string(), DIGEST);
        assert_eq!(link.size, 10);
        assert_eq!(link.created_at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_model_to_row() {
        let link = Link::new("/srv/share/notes.txt", DIGEST.parse().unwrap(), 10);
        let row = LinkRow::try_from(&link).unwrap();
        assert_eq!(row.identifier, link.id.to_string());
        assert_eq!(row.fingerprint, DIGEST);
        assert_eq!(row.size, 10);
    }

    #[test]
    fn test_corrupt_rows_are_rejected() {
        let mut bad_size = row();
        bad_size.size = -1;
        assert!(Link::try_from(bad_size).is_err());
        let mut bad_digest = row();
        bad_digest.fingerprint = "zz".to_string();
        assert!(Link::try_from(bad_digest).is_err());
        let mut bad_id = row();
        bad_id.identifier = "short".to_string();
        assert!(Link::try_from(bad_id).is_err());
    }
}
