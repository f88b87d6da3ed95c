//! Document object store for KYC and dispute-evidence uploads.
//!
//! The hosted object-storage collaborator is consumed through the
//! [`ObjectStore`] trait: upload-by-key, existence check, list-by-prefix and
//! delete. Two implementations are provided:
//!
//! - [`FsObjectStore`]: stores objects under a local directory, one file per
//!   key (production default)
//! - [`MemoryObjectStore`]: in-memory store for tests, with a switch that
//!   simulates the storage API reporting failure for an upload that actually
//!   landed (the duplicate-upload false negative the KYC flow tolerates)
//!
//! Public URLs are derived from a configured base URL; download URLs handed
//! to the admin console are HMAC-signed with an expiry.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Upload-by-key refused because the key is already occupied.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// Key is empty, absolute, or attempts path traversal.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Underlying filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Base URL and key do not combine into a valid URL.
    #[error("invalid storage url: {0}")]
    Url(#[from] url::ParseError),
}

/// Client interface for the document store.
///
/// Implementations must be shareable across request handlers
/// (`Send + Sync`); the application holds one behind an `Arc`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`. Fails with [`StorageError::AlreadyExists`]
    /// if the key is occupied; upload-by-key never overwrites.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys beginning with `prefix`, in unspecified order.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Remove the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Validate an object key before touching the filesystem.
///
/// Keys are slash-separated relative paths; empty keys, absolute paths and
/// `..` segments are rejected.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Filesystem-backed object store rooted at a configured directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Relative key for a file under the store root, using `/` separators.
    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(keys);
        }
        // Depth-first walk with an explicit stack; async fns don't recurse.
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    stack.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory object store for tests.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// When set, `put` stores the object but still reports failure, which is
    /// how the hosted storage API behaves when an upload races a retry. The
    /// KYC flow must treat that failure as success after an exists check.
    report_put_failures: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `put` calls store the object yet return
    /// `AlreadyExists`, simulating the storage API's false negative.
    pub fn fail_puts_after_storing(&self, enabled: bool) {
        self.report_put_failures.store(enabled, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), bytes.to_vec());
        if self.report_put_failures.load(Ordering::SeqCst) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Public URL for an object, joined onto the configured base URL.
pub fn public_url(base: &Url, key: &str) -> Result<Url, StorageError> {
    validate_key(key)?;
    Ok(base.join(key)?)
}

/// HMAC-SHA256 signature over `key` and its expiry timestamp.
pub fn sign_key(secret: &str, key: &str, expires_at: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(key.as_bytes());
    mac.update(b":");
    mac.update(expires_at.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Expiring, signed download URL for an object.
///
/// The signature covers the key and the expiry, so neither can be swapped
/// without invalidating the URL.
pub fn signed_url(
    base: &Url,
    key: &str,
    secret: &str,
    expires_at: i64,
) -> Result<Url, StorageError> {
    let mut url = public_url(base, key)?;
    let sig = sign_key(secret, key, expires_at);
    url.query_pairs_mut()
        .append_pair("expires", &expires_at.to_string())
        .append_pair("sig", &sig);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("kyc/user/pan_card").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("kyc/../secrets").is_err());
        assert!(validate_key("kyc//doc").is_err());
        assert!(validate_key("kyc/doc/").is_err());
    }

    #[tokio::test]
    async fn test_memory_store_put_exists_list_delete() {
        let store = MemoryObjectStore::new();
        store.put("kyc/u1/pan_card", b"pan").await.unwrap();
        store.put("kyc/u1/aadhaar_card", b"aadhaar").await.unwrap();
        store.put("kyc/u2/pan_card", b"other").await.unwrap();

        assert!(store.exists("kyc/u1/pan_card").await.unwrap());
        assert!(!store.exists("kyc/u1/gst_certificate").await.unwrap());

        let mut keys = store.list_prefix("kyc/u1/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["kyc/u1/aadhaar_card", "kyc/u1/pan_card"]);

        store.delete("kyc/u1/pan_card").await.unwrap();
        assert!(!store.exists("kyc/u1/pan_card").await.unwrap());
        // Idempotent delete.
        store.delete("kyc/u1/pan_card").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_put() {
        let store = MemoryObjectStore::new();
        store.put("kyc/u1/pan_card", b"pan").await.unwrap();
        let err = store.put("kyc/u1/pan_card", b"pan").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_memory_store_false_negative_still_stores() {
        let store = MemoryObjectStore::new();
        store.fail_puts_after_storing(true);
        let err = store.put("kyc/u1/pan_card", b"pan").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert!(store.exists("kyc/u1/pan_card").await.unwrap());
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let root = std::env::temp_dir().join(format!("docstore-test-{}", uuid::Uuid::new_v4()));
        let store = FsObjectStore::new(&root);

        store.put("kyc/u1/pan_card", b"pan bytes").await.unwrap();
        assert!(store.exists("kyc/u1/pan_card").await.unwrap());
        assert!(matches!(
            store.put("kyc/u1/pan_card", b"again").await,
            Err(StorageError::AlreadyExists(_))
        ));

        store.put("kyc/u1/cancelled_cheque", b"cheque").await.unwrap();
        let mut keys = store.list_prefix("kyc/u1/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["kyc/u1/cancelled_cheque", "kyc/u1/pan_card"]);

        store.delete("kyc/u1/pan_card").await.unwrap();
        assert!(!store.exists("kyc/u1/pan_card").await.unwrap());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn test_signed_url_carries_expiry_and_signature() {
        let base = Url::parse("http://localhost:3000/storage/").unwrap();
        let url = signed_url(&base, "kyc/u1/pan_card", "secret", 1_750_000_000).unwrap();
        assert!(url.as_str().starts_with("http://localhost:3000/storage/kyc/u1/pan_card?"));
        assert!(url.query().unwrap().contains("expires=1750000000"));
        assert!(url.query().unwrap().contains("sig="));
    }

    #[test]
    fn test_signature_depends_on_key_and_expiry() {
        let a = sign_key("secret", "kyc/u1/pan_card", 100);
        assert_eq!(a, sign_key("secret", "kyc/u1/pan_card", 100));
        assert_ne!(a, sign_key("secret", "kyc/u1/pan_card", 101));
        assert_ne!(a, sign_key("secret", "kyc/u1/aadhaar_card", 100));
        assert_ne!(a, sign_key("other", "kyc/u1/pan_card", 100));
    }
}
