use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ProfilePatch, UserId,
};
use super::draft::DraftForm;
use super::repository::{RecordStore, RepositoryError};
use super::storage::{BlobStorage, StorageError};
use super::uploads::UploadCoordinator;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Error raised by the vetting service. Every variant reaches the user as a
/// single human-readable message at the submit boundary.
#[derive(Debug, thiserror::Error)]
pub enum VettingServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service composing the upload coordinator and the record store: the
/// submission committer of the vetting flow.
pub struct TutorVettingService<S, R> {
    uploads: UploadCoordinator<S>,
    records: Arc<R>,
}

impl<S, R> TutorVettingService<S, R>
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    pub fn new(storage: Arc<S>, records: Arc<R>, bucket: impl Into<String>) -> Self {
        Self {
            uploads: UploadCoordinator::new(storage, bucket),
            records,
        }
    }

    /// Commit one wizard submission: upload every selected document, then
    /// insert the application record, then mirror the draft onto the profile.
    ///
    /// The two record writes share no transaction unless the store advertises
    /// batch commits. If the profile update fails after the insert succeeded,
    /// the error is surfaced and the records are left disagreeing; already
    /// uploaded objects are likewise never rolled back. Each call creates a
    /// fresh application, so a rejected tutor reapplying produces a new record
    /// rather than reviving the old one.
    pub fn submit(
        &self,
        user_id: &UserId,
        draft: &DraftForm,
    ) -> Result<ApplicationRecord, VettingServiceError> {
        let proof_uploads = self.uploads.upload_documents(user_id, &draft.files)?;

        let record = ApplicationRecord {
            id: next_application_id(),
            user_id: user_id.clone(),
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewer_id: None,
            rejection_reason: None,
            proof_uploads,
        };
        let patch = ProfilePatch::from_draft(draft);

        if self.records.supports_batch_commit() {
            let stored = self.records.commit_submission(record, patch)?;
            info!(application_id = %stored.id, %user_id, "vetting submission committed atomically");
            return Ok(stored);
        }

        let stored = self.records.insert_application(record)?;
        if let Err(err) = self.records.update_profile(user_id, patch) {
            warn!(
                application_id = %stored.id,
                %user_id,
                error = %err,
                "profile update failed after application insert; records are inconsistent"
            );
            return Err(err.into());
        }

        info!(application_id = %stored.id, %user_id, "vetting submission committed");
        Ok(stored)
    }

    /// Fetch an application for status displays.
    pub fn status(&self, id: &ApplicationId) -> Result<ApplicationRecord, VettingServiceError> {
        let record = self
            .records
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}
