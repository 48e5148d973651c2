//! Evidence photos: wire encoding and bucket paths.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::PhotoStore;

/// How long signed photo URLs stay valid unless the store says otherwise.
pub const SIGNED_URL_DAYS: i64 = 7;

pub fn signed_url_ttl() -> Duration {
    Duration::days(SIGNED_URL_DAYS)
}

/// A photo as sent by the browser: base64 payload plus MIME type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoUpload {
    pub content_type: String,
    pub data: String,
}

impl PhotoUpload {
    pub fn from_bytes(content_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            content_type: content_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|e| Error::invalid(format!("Photo could not be read: {e}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoKind {
    Proof,
    Damage,
    Task,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Proof => "proof",
            PhotoKind::Damage => "damage",
            PhotoKind::Task => "task",
        }
    }
}

/// `{user_id}/{owner_id}/{kind}_{millis}.jpg`, where the owner is the
/// assignment (check-ins) or the task (task evidence).
pub fn photo_path(user_id: &str, owner_id: &str, kind: PhotoKind, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}_{}.jpg",
        user_id,
        owner_id,
        kind.as_str(),
        at.timestamp_millis()
    )
}

/// Upload `photo` and return `(path, signed_url)`.
pub async fn upload_photo<P: PhotoStore>(
    photos: &P,
    path: String,
    photo: &PhotoUpload,
) -> Result<(String, String)> {
    let bytes = photo.decode()?;
    photos.upload(&path, bytes, &photo.content_type).await?;
    let url = photos.signed_url(&path, photos.url_ttl()).await?;
    Ok((path, url))
}

/// Best-effort removal of photos whose owning row was never written.
pub async fn discard_photos<P: PhotoStore>(photos: &P, paths: &[String]) {
    for path in paths {
        if let Err(e) = photos.remove(path).await {
            tracing::warn!("Failed to remove orphaned photo {}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_photo_path_layout() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            photo_path("u1", "a9", PhotoKind::Damage, at),
            "u1/a9/damage_1700000000123.jpg"
        );
    }

    #[test]
    fn test_upload_decodes_base64() {
        let photo = PhotoUpload::from_bytes("image/jpeg", &[0xff, 0xd8, 0xff]);
        assert_eq!(photo.decode().unwrap(), vec![0xff, 0xd8, 0xff]);

        let broken = PhotoUpload {
            content_type: "image/jpeg".to_string(),
            data: "***".to_string(),
        };
        assert!(broken.decode().is_err());
    }
}
