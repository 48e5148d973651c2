//! # Photo storage on the local filesystem
//!
//! [`FilePhotoStore`] implements [`audit::PhotoStore`] over a directory tree
//! rooted at `storage.photo_dir`. Objects are read back through the web
//! server's `/photos/{*path}` route, which only serves a file when the URL
//! carries a valid, unexpired HMAC-SHA256 signature over `path:expires`.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use audit::{Error, PhotoStore, Result};

use crate::settings::settings;

type HmacSha256 = Hmac<Sha256>;

/// Route prefix under which signed photo URLs are served.
pub const PHOTO_ROUTE: &str = "/photos";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid photo path")]
    InvalidPath,
    #[error("signed URL has expired")]
    Expired,
    #[error("signature mismatch")]
    BadSignature,
}

#[derive(Clone)]
pub struct FilePhotoStore {
    root: PathBuf,
    secret: Vec<u8>,
    ttl: Duration,
}

impl FilePhotoStore {
    pub fn new(root: impl Into<PathBuf>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            root: root.into(),
            secret: secret.into(),
            ttl: audit::photos::signed_url_ttl(),
        }
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object path to a file under the root, refusing anything that
    /// could escape it.
    fn resolve(&self, path: &str) -> std::result::Result<PathBuf, SignatureError> {
        let relative = Path::new(path);
        if path.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(SignatureError::InvalidPath);
        }
        Ok(self.root.join(relative))
    }

    fn mac(&self, path: &str, expires: i64) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Storage(e.to_string()))?;
        mac.update(path.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    pub fn sign(&self, path: &str, expires: i64) -> Result<String> {
        let mac = self.mac(path, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn url_for(&self, path: &str, expires: i64) -> Result<String> {
        let sig = self.sign(path, expires)?;
        Ok(format!("{PHOTO_ROUTE}/{path}?expires={expires}&sig={sig}"))
    }

    /// Check a signed URL's parameters against `now`.
    pub fn verify(
        &self,
        path: &str,
        expires: i64,
        sig: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SignatureError> {
        self.resolve(path)?;
        if now.timestamp() > expires {
            return Err(SignatureError::Expired);
        }
        let expected = hex::decode(sig).map_err(|_| SignatureError::BadSignature)?;
        let mac = self
            .mac(path, expires)
            .map_err(|_| SignatureError::BadSignature)?;
        mac.verify_slice(&expected)
            .map_err(|_| SignatureError::BadSignature)
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let file = self
            .resolve(path)
            .map_err(|e| Error::Storage(e.to_string()))?;
        tokio::fs::read(&file).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found("photo", path),
            _ => Error::Storage(e.to_string()),
        })
    }
}

pub fn content_type_for(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

impl PhotoStore for FilePhotoStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let file = self
            .resolve(path)
            .map_err(|e| Error::Storage(e.to_string()))?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(e.to_string()))?;
        }
        tokio::fs::write(&file, bytes)
            .await
            .map_err(|e| Error::Storage(e.to_string()))
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String> {
        let expires = (Utc::now() + expires_in).timestamp();
        self.url_for(path, expires)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let file = self
            .resolve(path)
            .map_err(|e| Error::Storage(e.to_string()))?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }

    fn url_ttl(&self) -> Duration {
        self.ttl
    }
}

static PHOTOS: OnceLock<FilePhotoStore> = OnceLock::new();

/// The process-wide photo store configured by the `storage` settings.
pub fn photo_store() -> &'static FilePhotoStore {
    PHOTOS.get_or_init(|| {
        let storage = &settings().storage;
        let secret = if storage.signing_secret.is_empty() {
            tracing::warn!("storage.signing_secret is not set; photo URLs will not survive a restart");
            rand::random::<[u8; 32]>().to_vec()
        } else {
            storage.signing_secret.as_bytes().to_vec()
        };
        FilePhotoStore::new(&storage.photo_dir, secret)
            .with_url_ttl(Duration::days(storage.url_expiry_days.max(1)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> FilePhotoStore {
        FilePhotoStore::new(dir.path(), b"test-secret".to_vec())
    }

    fn params(url: &str) -> (String, i64, String) {
        let (path, query) = url
            .strip_prefix("/photos/")
            .and_then(|rest| rest.split_once('?'))
            .unwrap();
        let mut expires = 0;
        let mut sig = String::new();
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("sig", v) => sig = v.to_string(),
                _ => {}
            }
        }
        (path.to_string(), expires, sig)
    }

    #[tokio::test]
    async fn test_upload_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let photos = store(&dir);
        let path = "u1/a1/proof_1700000000000.jpg";

        photos.upload(path, vec![1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(photos.read(path).await.unwrap(), vec![1, 2, 3]);

        photos.remove(path).await.unwrap();
        assert!(matches!(photos.read(path).await, Err(Error::NotFound { .. })));
        // Removing twice is fine.
        photos.remove(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_signed_url_verifies_until_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let photos = store(&dir);
        let url = photos
            .signed_url("u1/a1/damage_1.jpg", Duration::days(7))
            .await
            .unwrap();
        let (path, expires, sig) = params(&url);

        assert_eq!(photos.verify(&path, expires, &sig, Utc::now()), Ok(()));

        let later = Utc::now() + Duration::days(8);
        assert_eq!(
            photos.verify(&path, expires, &sig, later),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            photos.verify("u2/a1/damage_1.jpg", expires, &sig, Utc::now()),
            Err(SignatureError::BadSignature)
        );
        assert_eq!(
            photos.verify(&path, expires + 60, &sig, Utc::now()),
            Err(SignatureError::BadSignature)
        );
    }

    #[tokio::test]
    async fn test_uploaded_photo_url_uses_configured_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let photos = store(&dir).with_url_ttl(Duration::days(1));
        let photo = audit::photos::PhotoUpload::from_bytes("image/jpeg", &[0xff, 0xd8]);

        let (path, url) =
            audit::photos::upload_photo(&photos, "u1/t1/task_1.jpg".to_string(), &photo)
                .await
                .unwrap();
        let (signed_path, expires, sig) = params(&url);
        assert_eq!(signed_path, path);
        assert!(expires <= (Utc::now() + Duration::days(1)).timestamp());

        assert_eq!(photos.verify(&path, expires, &sig, Utc::now()), Ok(()));
        assert_eq!(
            photos.verify(&path, expires, &sig, Utc::now() + Duration::days(2)),
            Err(SignatureError::Expired)
        );
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let photos = store(&dir);
        assert!(photos.upload("../evil.jpg", vec![0], "image/jpeg").await.is_err());
        assert!(photos.upload("/etc/evil.jpg", vec![0], "image/jpeg").await.is_err());
        assert_eq!(
            photos.verify("u1/../../x", i64::MAX, "00", Utc::now()),
            Err(SignatureError::InvalidPath)
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a/b/proof_1.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a/b/c.png"), "image/png");
        assert_eq!(content_type_for("a/b/c"), "application/octet-stream");
    }
}
