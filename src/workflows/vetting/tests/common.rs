use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::vetting::domain::{
    ApplicationId, ApplicationRecord, ProfilePatch, TeachingMode, TutorProfile, UserId,
};
use crate::workflows::vetting::draft::{DocumentFile, DraftForm};
use crate::workflows::vetting::memory::{MemoryBlobStorage, MemoryRecordStore};
use crate::workflows::vetting::repository::{RecordStore, RepositoryError};
use crate::workflows::vetting::storage::{BlobStorage, StorageError};
use crate::workflows::vetting::uploads::DOCUMENTS_BUCKET;
use crate::workflows::vetting::wizard::NavigationHost;
use crate::workflows::vetting::TutorVettingService;

pub(super) fn user() -> UserId {
    UserId("tutor-1".to_string())
}

pub(super) fn seeded_records() -> Arc<MemoryRecordStore> {
    let records = Arc::new(MemoryRecordStore::default());
    records.seed_profile(TutorProfile::registered(user(), "Boitumelo Dube"));
    records
}

/// Draft with every required field filled and one file in each of the five
/// document categories.
pub(super) fn complete_draft() -> DraftForm {
    let mut draft = DraftForm::default();

    draft.personal.full_name = "Boitumelo Dube".to_string();
    draft.personal.phone = "+267 72 000 111".to_string();
    draft.personal.address = "Plot 881, Francistown".to_string();
    draft.personal.date_of_birth = NaiveDate::from_ymd_opt(1990, 7, 2);

    draft.education.highest_qualification = "master".to_string();
    draft.education.institution = "University of Botswana".to_string();
    draft.education.graduation_year = Some(2015);
    draft.education.field_of_study = "Physics".to_string();

    draft.experience.years_of_experience = Some(4);
    draft.experience.teaching_approach = "Socratic questioning with drills.".to_string();
    draft
        .experience
        .subjects_expertise
        .insert("Physics".to_string());
    draft
        .experience
        .age_groups
        .insert("A-Level (17-18 years)".to_string());

    draft
        .availability
        .availability_hours
        .insert("Tuesday Evening".to_string());
    draft.availability.hourly_rate = Some(150.0);
    draft.availability.preferred_mode = Some(TeachingMode::Online);

    draft
        .files
        .education_certificates
        .push(DocumentFile::new("degree.pdf", b"degree bytes".to_vec()));
    draft
        .files
        .teaching_certificates
        .push(DocumentFile::new("tefl.pdf", b"tefl bytes".to_vec()));
    draft.files.identity_document = Some(DocumentFile::new("passport.jpg", b"id bytes".to_vec()));
    draft.files.cv_resume = Some(DocumentFile::new("cv.pdf", b"cv bytes".to_vec()));
    draft
        .files
        .portfolio
        .push(DocumentFile::new("worksheet.png", b"portfolio bytes".to_vec()));

    draft
}

pub(super) fn build_service() -> (
    Arc<TutorVettingService<MemoryBlobStorage, MemoryRecordStore>>,
    Arc<MemoryBlobStorage>,
    Arc<MemoryRecordStore>,
) {
    let storage = Arc::new(MemoryBlobStorage::default());
    let records = seeded_records();
    let service = Arc::new(TutorVettingService::new(
        storage.clone(),
        records.clone(),
        DOCUMENTS_BUCKET,
    ));
    (service, storage, records)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum HostEvent {
    Closed,
    Redirected(String),
}

/// Navigation host fake recording the signals it receives.
#[derive(Default)]
pub(super) struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub(super) fn events(&self) -> Vec<HostEvent> {
        self.events.lock().expect("host mutex poisoned").clone()
    }
}

impl NavigationHost for RecordingHost {
    fn close(&self) {
        self.events
            .lock()
            .expect("host mutex poisoned")
            .push(HostEvent::Closed);
    }

    fn on_success(&self, redirect: &str) {
        self.events
            .lock()
            .expect("host mutex poisoned")
            .push(HostEvent::Redirected(redirect.to_string()));
    }
}

/// Storage fake that refuses objects under a path prefix and stores the rest.
pub(super) struct DenyPrefixStorage {
    pub(super) inner: MemoryBlobStorage,
    deny_prefix: String,
}

impl DenyPrefixStorage {
    pub(super) fn denying(prefix: impl Into<String>) -> Self {
        Self {
            inner: MemoryBlobStorage::default(),
            deny_prefix: prefix.into(),
        }
    }
}

impl BlobStorage for DenyPrefixStorage {
    fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        if path.starts_with(&self.deny_prefix) {
            return Err(StorageError::Backend("object rejected".to_string()));
        }
        self.inner.store(bucket, path, bytes, content_type)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.inner.public_url(bucket, path)
    }
}

/// Record store that is entirely offline.
pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn insert_application(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_profile(
        &self,
        _user_id: &UserId,
        _patch: ProfilePatch,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_profile(&self, _user_id: &UserId) -> Result<Option<TutorProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Record store whose insert fails while counting profile-update attempts, so
/// tests can prove the committer never reaches the second write.
#[derive(Default)]
pub(super) struct InsertFailStore {
    pub(super) profile_updates: AtomicUsize,
}

impl RecordStore for InsertFailStore {
    fn insert_application(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("insert refused".to_string()))
    }

    fn update_profile(
        &self,
        _user_id: &UserId,
        _patch: ProfilePatch,
    ) -> Result<(), RepositoryError> {
        self.profile_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn fetch_profile(&self, _user_id: &UserId) -> Result<Option<TutorProfile>, RepositoryError> {
        Ok(None)
    }
}

/// Record store where the application insert lands but the profile update
/// fails, reproducing the torn-write window.
pub(super) struct ProfileUpdateFailStore {
    pub(super) inner: MemoryRecordStore,
}

impl ProfileUpdateFailStore {
    pub(super) fn new() -> Self {
        let inner = MemoryRecordStore::default();
        inner.seed_profile(TutorProfile::registered(user(), "Boitumelo Dube"));
        Self { inner }
    }
}

impl RecordStore for ProfileUpdateFailStore {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert_application(record)
    }

    fn update_profile(
        &self,
        _user_id: &UserId,
        _patch: ProfilePatch,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("profiles offline".to_string()))
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch_application(id)
    }

    fn fetch_profile(&self, user_id: &UserId) -> Result<Option<TutorProfile>, RepositoryError> {
        self.inner.fetch_profile(user_id)
    }
}
