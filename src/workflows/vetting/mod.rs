//! Tutor vetting workflow: the multi-step application wizard, its draft state
//! and validation, sequential document uploads, and the two-write submission
//! commit against the hosted record store.

pub mod domain;
pub mod draft;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod uploads;
pub mod validator;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, DocumentCategory, ProfilePatch,
    ProofUploads, TeachingMode, TutorProfile, UnknownStatus, UserId,
};
pub use draft::{DocumentFile, DraftForm, FilesBundle, AGE_GROUPS, SUBJECTS};
pub use memory::{MemoryBlobStorage, MemoryRecordStore};
pub use repository::{ApplicationStatusView, RecordStore, RepositoryError};
pub use router::{vetting_router, SubmissionRequest};
pub use service::{TutorVettingService, VettingServiceError};
pub use storage::{BlobStorage, StorageError};
pub use uploads::{UploadCoordinator, DOCUMENTS_BUCKET};
pub use validator::{validate_draft, validate_step, ValidationError, WizardStep};
pub use wizard::{NavigationHost, VettingWizard, WizardError, SUBMITTED_REDIRECT};
