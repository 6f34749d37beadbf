use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::draft::DraftForm;

/// Identifier wrapper for submitted tutor applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for marketplace accounts (tutors and reviewers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        UserId(String::new())
    }
}

/// Review state of a vetting submission.
///
/// Transitions are `pending -> approved` or `pending -> rejected`, performed by a
/// reviewer collaborator. A rejected tutor reapplies by submitting a fresh
/// application; the old record is never mutated back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Whether a reviewer may move a record from `self` to `next`.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
        )
    }
}

/// Raised when a status label read from a collaborator is not one of the
/// closed set. Unrecognized values are rejected at the record-store boundary
/// instead of being carried through as strings.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// How the tutor prefers to deliver sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeachingMode {
    Online,
    InPerson,
    Both,
}

impl TeachingMode {
    pub const fn label(self) -> &'static str {
        match self {
            TeachingMode::Online => "online",
            TeachingMode::InPerson => "in_person",
            TeachingMode::Both => "both",
        }
    }
}

/// Storage categories for vetting documents. The subpath segments match the
/// bucket layout used by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentCategory {
    EducationCertificates,
    TeachingCertificates,
    IdentityDocument,
    CvResume,
    Portfolio,
}

impl DocumentCategory {
    pub const fn subpath(self) -> &'static str {
        match self {
            DocumentCategory::EducationCertificates => "education",
            DocumentCategory::TeachingCertificates => "teaching",
            DocumentCategory::IdentityDocument => "identity",
            DocumentCategory::CvResume => "cv",
            DocumentCategory::Portfolio => "portfolio",
        }
    }
}

/// Reference URLs for the documents attached to one application, grouped the
/// way the wizard collects them. List categories preserve upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofUploads {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education_certificates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teaching_certificates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_resume: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub portfolio: Vec<String>,
}

impl ProofUploads {
    pub fn reference_count(&self) -> usize {
        self.education_certificates.len()
            + self.teaching_certificates.len()
            + usize::from(self.identity_document.is_some())
            + usize::from(self.cv_resume.is_some())
            + self.portfolio.len()
    }
}

/// One tutor vetting submission. Created by the submission committer at wizard
/// completion and never mutated by the client afterwards; review metadata is
/// filled in by the reviewer collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_id: Option<UserId>,
    pub rejection_reason: Option<String>,
    pub proof_uploads: ProofUploads,
}

/// The tutor's public/operational profile row. Created at registration; the
/// vetting flow only ever updates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub highest_qualification: String,
    pub institution: String,
    pub graduation_year: Option<u16>,
    pub field_of_study: String,
    pub gpa_grade: String,
    pub years_of_experience: Option<u8>,
    pub previous_tutoring: String,
    pub teaching_approach: String,
    pub subjects_expertise: Vec<String>,
    pub age_groups: Vec<String>,
    pub availability_hours: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub preferred_mode: Option<TeachingMode>,
    pub application_status: Option<ApplicationStatus>,
}

impl TutorProfile {
    /// Minimal profile as created by account registration.
    pub fn registered(user_id: UserId, full_name: impl Into<String>) -> Self {
        Self {
            user_id,
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    pub fn apply_patch(&mut self, patch: ProfilePatch) {
        let ProfilePatch {
            full_name,
            phone,
            address,
            date_of_birth,
            highest_qualification,
            institution,
            graduation_year,
            field_of_study,
            gpa_grade,
            years_of_experience,
            previous_tutoring,
            teaching_approach,
            subjects_expertise,
            age_groups,
            availability_hours,
            hourly_rate,
            preferred_mode,
            application_status,
        } = patch;

        self.full_name = full_name;
        self.phone = phone;
        self.address = address;
        self.date_of_birth = date_of_birth;
        self.highest_qualification = highest_qualification;
        self.institution = institution;
        self.graduation_year = graduation_year;
        self.field_of_study = field_of_study;
        self.gpa_grade = gpa_grade;
        self.years_of_experience = years_of_experience;
        self.previous_tutoring = previous_tutoring;
        self.teaching_approach = teaching_approach;
        self.subjects_expertise = subjects_expertise;
        self.age_groups = age_groups;
        self.availability_hours = availability_hours;
        self.hourly_rate = hourly_rate;
        self.preferred_mode = preferred_mode;
        self.application_status = Some(application_status);
    }
}

/// Every form field collected by the wizard plus the mirrored application
/// status, applied to the profile row in the second commit write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub highest_qualification: String,
    pub institution: String,
    pub graduation_year: Option<u16>,
    pub field_of_study: String,
    pub gpa_grade: String,
    pub years_of_experience: Option<u8>,
    pub previous_tutoring: String,
    pub teaching_approach: String,
    pub subjects_expertise: Vec<String>,
    pub age_groups: Vec<String>,
    pub availability_hours: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub preferred_mode: Option<TeachingMode>,
    pub application_status: ApplicationStatus,
}

impl ProfilePatch {
    /// Snapshot the draft into the patch written alongside a new application.
    /// Fields the user never filled in are carried as-is; completeness is the
    /// validator's concern, not the committer's.
    pub fn from_draft(draft: &DraftForm) -> Self {
        Self {
            full_name: draft.personal.full_name.clone(),
            phone: draft.personal.phone.clone(),
            address: draft.personal.address.clone(),
            date_of_birth: draft.personal.date_of_birth,
            highest_qualification: draft.education.highest_qualification.clone(),
            institution: draft.education.institution.clone(),
            graduation_year: draft.education.graduation_year,
            field_of_study: draft.education.field_of_study.clone(),
            gpa_grade: draft.education.gpa_grade.clone(),
            years_of_experience: draft.experience.years_of_experience,
            previous_tutoring: draft.experience.previous_tutoring.clone(),
            teaching_approach: draft.experience.teaching_approach.clone(),
            subjects_expertise: draft.experience.subjects_expertise.iter().cloned().collect(),
            age_groups: draft.experience.age_groups.iter().cloned().collect(),
            availability_hours: draft.availability.availability_hours.iter().cloned().collect(),
            hourly_rate: draft.availability.hourly_rate,
            preferred_mode: draft.availability.preferred_mode,
            application_status: ApplicationStatus::Pending,
        }
    }
}
