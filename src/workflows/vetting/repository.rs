use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicationId, ApplicationRecord, ProfilePatch, TutorProfile, UserId};

/// Error enumeration for record-store failures. The hosted platform surfaces
/// failures opaquely, so `Unavailable` carries its message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store does not support batched writes")]
    BatchUnsupported,
    #[error(transparent)]
    UnknownStatus(#[from] super::domain::UnknownStatus),
}

/// Boundary to the hosted relational store holding applications and profiles.
///
/// Stores backed by a database that can apply both submission writes in one
/// transaction should override `supports_batch_commit` and `commit_submission`;
/// the committer falls back to the sequential insert-then-update pair (and its
/// torn-write window) when batching is unavailable.
pub trait RecordStore: Send + Sync {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError>;

    fn update_profile(&self, user_id: &UserId, patch: ProfilePatch) -> Result<(), RepositoryError>;

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;

    fn fetch_profile(&self, user_id: &UserId) -> Result<Option<TutorProfile>, RepositoryError>;

    fn supports_batch_commit(&self) -> bool {
        false
    }

    /// Apply the application insert and profile update as one unit. Only
    /// meaningful when `supports_batch_commit` returns true.
    fn commit_submission(
        &self,
        record: ApplicationRecord,
        patch: ProfilePatch,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let _ = (record, patch);
        Err(RepositoryError::BatchUnsupported)
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
    pub document_references: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.label(),
            submitted_at: self.submitted_at,
            document_references: self.proof_uploads.reference_count(),
            rejection_reason: self.rejection_reason.clone(),
        }
    }
}
