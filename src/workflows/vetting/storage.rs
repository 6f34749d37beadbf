/// Opaque failure from the blob-storage collaborator. The platform does not
/// expose distinguishable causes, so neither do we.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage operation failed: {0}")]
    Backend(String),
}

/// Boundary to the hosted file-storage platform.
///
/// `store` writes one object; `public_url` derives the shareable reference for
/// a stored object. Durability, permissions, and retention are the platform's
/// concern.
pub trait BlobStorage: Send + Sync {
    fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
