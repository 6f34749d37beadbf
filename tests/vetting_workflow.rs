use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use tutorhub_vetting::workflows::vetting::{
    ApplicationStatus, BlobStorage, DocumentFile, DraftForm, MemoryBlobStorage, MemoryRecordStore,
    NavigationHost, StorageError, TeachingMode, TutorProfile, TutorVettingService, UserId,
    VettingWizard, WizardStep, DOCUMENTS_BUCKET, SUBMITTED_REDIRECT,
};

fn applicant() -> UserId {
    UserId("tutor-e2e".to_string())
}

fn fill_draft(draft: &mut DraftForm) {
    draft.personal.full_name = "Kefilwe Molefe".to_string();
    draft.personal.phone = "+267 74 555 010".to_string();
    draft.personal.address = "Plot 40, Maun".to_string();
    draft.personal.date_of_birth = NaiveDate::from_ymd_opt(1988, 11, 30);

    draft.education.highest_qualification = "bachelor".to_string();
    draft.education.institution = "Botswana Accountancy College".to_string();
    draft.education.graduation_year = Some(2011);
    draft.education.field_of_study = "Accounting".to_string();

    draft.experience.years_of_experience = Some(9);
    draft.experience.teaching_approach = "Past papers under exam conditions.".to_string();
    draft
        .experience
        .subjects_expertise
        .insert("Mathematics".to_string());
    draft
        .experience
        .age_groups
        .insert("Secondary (13-16 years)".to_string());

    draft
        .availability
        .availability_hours
        .insert("Sunday Afternoon".to_string());
    draft.availability.hourly_rate = Some(200.0);
    draft.availability.preferred_mode = Some(TeachingMode::InPerson);

    draft
        .files
        .education_certificates
        .push(DocumentFile::new("bcom.pdf", b"bcom".to_vec()));
    draft
        .files
        .teaching_certificates
        .push(DocumentFile::new("brevet.pdf", b"brevet".to_vec()));
    draft.files.identity_document = Some(DocumentFile::new("omang.jpg", b"omang".to_vec()));
    draft.files.cv_resume = Some(DocumentFile::new("cv.pdf", b"cv".to_vec()));
    draft
        .files
        .portfolio
        .push(DocumentFile::new("lesson-plan.pdf", b"plan".to_vec()));
}

struct CollectingHost {
    redirects: Mutex<Vec<String>>,
}

impl CollectingHost {
    fn new() -> Self {
        Self {
            redirects: Mutex::new(Vec::new()),
        }
    }
}

impl NavigationHost for CollectingHost {
    fn close(&self) {}

    fn on_success(&self, redirect: &str) {
        self.redirects
            .lock()
            .expect("host mutex poisoned")
            .push(redirect.to_string());
    }
}

/// Storage that refuses the first identity upload and succeeds afterwards.
struct FlakyIdentityStorage {
    inner: MemoryBlobStorage,
    should_fail: AtomicBool,
}

impl FlakyIdentityStorage {
    fn new() -> Self {
        Self {
            inner: MemoryBlobStorage::default(),
            should_fail: AtomicBool::new(true),
        }
    }
}

impl BlobStorage for FlakyIdentityStorage {
    fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        if path.contains("/identity/") && self.should_fail.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Backend("transient outage".to_string()));
        }
        self.inner.store(bucket, path, bytes, content_type)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.inner.public_url(bucket, path)
    }
}

#[test]
fn wizard_walkthrough_submits_one_pending_application() {
    let storage = Arc::new(MemoryBlobStorage::default());
    let records = Arc::new(MemoryRecordStore::default());
    records.seed_profile(TutorProfile::registered(applicant(), "Kefilwe Molefe"));

    let service = Arc::new(TutorVettingService::new(
        storage.clone(),
        records.clone(),
        DOCUMENTS_BUCKET,
    ));
    let mut wizard = VettingWizard::open(applicant(), service);

    fill_draft(wizard.draft_mut());
    for expected in 2..=6 {
        let landed = wizard.advance().expect("each step is complete");
        assert_eq!(landed.index(), expected);
    }
    assert_eq!(wizard.step(), WizardStep::Review);

    let host = CollectingHost::new();
    let record = wizard.submit(&host).expect("submission succeeds");

    assert_eq!(record.status, ApplicationStatus::Pending);
    assert_eq!(record.proof_uploads.reference_count(), 5);
    assert_eq!(storage.object_count(), 5);
    assert!(!wizard.is_open());

    let history = records.applications_for(&applicant());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, record.id);

    let profile = records.profile(&applicant()).expect("profile present");
    assert_eq!(profile.application_status, Some(ApplicationStatus::Pending));
    assert_eq!(profile.full_name, "Kefilwe Molefe");
    assert_eq!(profile.hourly_rate, Some(200.0));

    assert_eq!(
        *host.redirects.lock().expect("host mutex poisoned"),
        vec![SUBMITTED_REDIRECT.to_string()]
    );
    assert_eq!(SUBMITTED_REDIRECT, "/dashboard/tutor?application=submitted");
}

#[test]
fn retry_after_a_partial_upload_failure_leaves_orphaned_objects() {
    let storage = Arc::new(FlakyIdentityStorage::new());
    let records = Arc::new(MemoryRecordStore::default());
    records.seed_profile(TutorProfile::registered(applicant(), "Kefilwe Molefe"));

    let service = Arc::new(TutorVettingService::new(
        storage.clone(),
        records.clone(),
        DOCUMENTS_BUCKET,
    ));
    let mut wizard = VettingWizard::open(applicant(), service);

    fill_draft(wizard.draft_mut());
    while wizard.step() != WizardStep::Review {
        wizard.advance().expect("draft is complete");
    }

    let host = CollectingHost::new();
    wizard.submit(&host).expect_err("identity upload fails once");

    // Education and teaching uploads landed before the failure aborted the
    // sequence; no application was created.
    assert_eq!(storage.inner.object_count(), 2);
    assert!(records.applications_for(&applicant()).is_empty());
    assert!(wizard.is_open());
    assert!(wizard.last_error().is_some());

    // The retry re-uploads everything under fresh random names, so the two
    // objects from the failed attempt stay behind unreferenced.
    let record = wizard.submit(&host).expect("retry succeeds");
    assert_eq!(record.proof_uploads.reference_count(), 5);
    assert_eq!(storage.inner.object_count(), 7);

    let education_objects = storage
        .inner
        .keys()
        .into_iter()
        .filter(|key| key.contains("/education/"))
        .count();
    assert_eq!(education_objects, 2);
}

#[test]
fn approval_after_submission_is_mirrored_onto_the_profile() {
    let storage = Arc::new(MemoryBlobStorage::default());
    let records = Arc::new(MemoryRecordStore::default());
    records.seed_profile(TutorProfile::registered(applicant(), "Kefilwe Molefe"));

    let service = Arc::new(TutorVettingService::new(
        storage,
        records.clone(),
        DOCUMENTS_BUCKET,
    ));
    let mut draft = DraftForm::default();
    fill_draft(&mut draft);
    let record = service.submit(&applicant(), &draft).expect("submit");

    records
        .record_review(
            &record.id,
            ApplicationStatus::Approved,
            UserId("reviewer-9".to_string()),
            None,
        )
        .expect("pending may be approved");

    let approved = records.application(&record.id).expect("record present");
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(approved.reviewer_id, Some(UserId("reviewer-9".to_string())));

    let profile = records.profile(&applicant()).expect("profile present");
    assert_eq!(profile.application_status, Some(ApplicationStatus::Approved));
}
