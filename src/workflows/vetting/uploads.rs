use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::domain::{DocumentCategory, ProofUploads, UserId};
use super::draft::{DocumentFile, FilesBundle};
use super::storage::{BlobStorage, StorageError};

/// Bucket holding vetting documents unless configuration overrides it.
pub const DOCUMENTS_BUCKET: &str = "tutor-documents";

/// Uploads a files bundle to blob storage and collects the resulting
/// reference URLs.
///
/// Uploads are strictly sequential, so an error always points at exactly one
/// in-flight object. The first failure aborts the remaining uploads and the
/// call returns no partial bundle; objects stored before the failure are left
/// behind in the bucket (there is no rollback sweep).
pub struct UploadCoordinator<S> {
    storage: Arc<S>,
    bucket: String,
}

impl<S> UploadCoordinator<S>
where
    S: BlobStorage,
{
    pub fn new(storage: Arc<S>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload every non-empty category and return the full reference bundle.
    /// List categories come back in input order.
    pub fn upload_documents(
        &self,
        user_id: &UserId,
        files: &FilesBundle,
    ) -> Result<ProofUploads, StorageError> {
        let mut uploads = ProofUploads::default();

        for file in &files.education_certificates {
            let url = self.upload(user_id, DocumentCategory::EducationCertificates, file)?;
            uploads.education_certificates.push(url);
        }

        for file in &files.teaching_certificates {
            let url = self.upload(user_id, DocumentCategory::TeachingCertificates, file)?;
            uploads.teaching_certificates.push(url);
        }

        if let Some(file) = &files.identity_document {
            uploads.identity_document =
                Some(self.upload(user_id, DocumentCategory::IdentityDocument, file)?);
        }

        if let Some(file) = &files.cv_resume {
            uploads.cv_resume = Some(self.upload(user_id, DocumentCategory::CvResume, file)?);
        }

        for file in &files.portfolio {
            let url = self.upload(user_id, DocumentCategory::Portfolio, file)?;
            uploads.portfolio.push(url);
        }

        Ok(uploads)
    }

    fn upload(
        &self,
        user_id: &UserId,
        category: DocumentCategory,
        file: &DocumentFile,
    ) -> Result<String, StorageError> {
        let path = object_path(user_id, category, &file.file_name);
        let content_type = mime_guess::from_path(&file.file_name).first_or_octet_stream();

        debug!(%user_id, category = category.subpath(), %path, "uploading vetting document");
        self.storage
            .store(&self.bucket, &path, &file.bytes, content_type.essence_str())?;

        Ok(self.storage.public_url(&self.bucket, &path))
    }
}

/// Object key namespaced by owner and category, with a random file name so
/// repeat submissions never collide. The original extension is kept for
/// content-type sniffing on the serving side.
fn object_path(user_id: &UserId, category: DocumentCategory, original_name: &str) -> String {
    let random = Uuid::new_v4();
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}/{}/{}.{}", user_id, category.subpath(), random, ext),
        None => format!("{}/{}/{}", user_id, category.subpath(), random),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_paths_are_namespaced_and_unique() {
        let user = UserId("tutor-7".to_string());
        let first = object_path(&user, DocumentCategory::CvResume, "resume.pdf");
        let second = object_path(&user, DocumentCategory::CvResume, "resume.pdf");

        assert!(first.starts_with("tutor-7/cv/"));
        assert!(first.ends_with(".pdf"));
        assert_ne!(first, second);
    }

    #[test]
    fn object_paths_tolerate_missing_extensions() {
        let user = UserId("tutor-7".to_string());
        let path = object_path(&user, DocumentCategory::IdentityDocument, "passport");
        assert!(path.starts_with("tutor-7/identity/"));
        assert!(!path.contains('.'));
    }
}
