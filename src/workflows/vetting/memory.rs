use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ProfilePatch, TutorProfile, UserId,
};
use super::repository::{RecordStore, RepositoryError};
use super::storage::{BlobStorage, StorageError};

/// In-memory record store backing the demo binary, the default serve wiring,
/// and the test suites. Profiles must be seeded before a submission can update
/// them, mirroring the platform where registration creates the profile row.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
    batch_commit: bool,
}

#[derive(Default)]
struct Inner {
    applications: HashMap<ApplicationId, ApplicationRecord>,
    profiles: HashMap<UserId, TutorProfile>,
}

impl MemoryRecordStore {
    /// A store that advertises the atomic batch-commit capability.
    pub fn with_batch_commit() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            batch_commit: true,
        }
    }

    pub fn seed_profile(&self, profile: TutorProfile) {
        let mut inner = self.inner.lock().expect("record store mutex poisoned");
        inner.profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn application(&self, id: &ApplicationId) -> Option<ApplicationRecord> {
        let inner = self.inner.lock().expect("record store mutex poisoned");
        inner.applications.get(id).cloned()
    }

    pub fn applications_for(&self, user_id: &UserId) -> Vec<ApplicationRecord> {
        let inner = self.inner.lock().expect("record store mutex poisoned");
        let mut records: Vec<_> = inner
            .applications
            .values()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.submitted_at);
        records
    }

    pub fn profile(&self, user_id: &UserId) -> Option<TutorProfile> {
        let inner = self.inner.lock().expect("record store mutex poisoned");
        inner.profiles.get(user_id).cloned()
    }

    /// Stand-in for the reviewer collaborator: move a pending application to
    /// `approved` or `rejected` and mirror the decision onto the profile.
    /// Any other transition is refused.
    pub fn record_review(
        &self,
        id: &ApplicationId,
        decision: ApplicationStatus,
        reviewer: UserId,
        rejection_reason: Option<String>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("record store mutex poisoned");
        let record = inner
            .applications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;

        if !record.status.can_transition_to(decision) {
            return Err(RepositoryError::Conflict);
        }

        record.status = decision;
        record.reviewed_at = Some(Utc::now());
        record.reviewer_id = Some(reviewer);
        record.rejection_reason = match decision {
            ApplicationStatus::Rejected => rejection_reason,
            _ => None,
        };

        let user_id = record.user_id.clone();
        if let Some(profile) = inner.profiles.get_mut(&user_id) {
            profile.application_status = Some(decision);
        }
        Ok(())
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("record store mutex poisoned");
        if inner.applications.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.applications.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_profile(&self, user_id: &UserId, patch: ProfilePatch) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("record store mutex poisoned");
        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or(RepositoryError::NotFound)?;
        profile.apply_patch(patch);
        Ok(())
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.application(id))
    }

    fn fetch_profile(&self, user_id: &UserId) -> Result<Option<TutorProfile>, RepositoryError> {
        Ok(self.profile(user_id))
    }

    fn supports_batch_commit(&self) -> bool {
        self.batch_commit
    }

    fn commit_submission(
        &self,
        record: ApplicationRecord,
        patch: ProfilePatch,
    ) -> Result<ApplicationRecord, RepositoryError> {
        if !self.batch_commit {
            return Err(RepositoryError::BatchUnsupported);
        }

        let mut inner = self.inner.lock().expect("record store mutex poisoned");
        if inner.applications.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        // Both writes are checked before either is applied.
        let user_id = record.user_id.clone();
        if !inner.profiles.contains_key(&user_id) {
            return Err(RepositoryError::NotFound);
        }

        inner.applications.insert(record.id.clone(), record.clone());
        inner
            .profiles
            .get_mut(&user_id)
            .expect("profile checked above")
            .apply_patch(patch);
        Ok(record)
    }
}

/// In-memory blob storage with `memory://` reference URLs.
#[derive(Default)]
pub struct MemoryBlobStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl MemoryBlobStorage {
    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("storage mutex poisoned").len()
    }

    /// Object keys (`bucket/path`) in insertion-independent sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .get(&object_key(bucket, path))
            .cloned()
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}

impl BlobStorage for MemoryBlobStorage {
    fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().expect("storage mutex poisoned");
        objects.insert(
            object_key(bucket, path),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}
