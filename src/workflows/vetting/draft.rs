use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::TeachingMode;

/// Subjects offered by the marketplace's vetting form.
pub const SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Science",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Computer Science",
    "Art",
    "Music",
    "Languages",
];

/// Age groups a tutor may elect to teach.
pub const AGE_GROUPS: &[&str] = &[
    "Primary (6-12 years)",
    "Secondary (13-16 years)",
    "A-Level (17-18 years)",
    "Adult Education",
];

/// A file the user selected but has not yet uploaded. Bytes live in memory for
/// the lifetime of the wizard session only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Files selected on the document step, grouped by category. List categories
/// keep selection order; single categories hold at most one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesBundle {
    #[serde(default)]
    pub education_certificates: Vec<DocumentFile>,
    #[serde(default)]
    pub teaching_certificates: Vec<DocumentFile>,
    #[serde(default)]
    pub identity_document: Option<DocumentFile>,
    #[serde(default)]
    pub cv_resume: Option<DocumentFile>,
    #[serde(default)]
    pub portfolio: Vec<DocumentFile>,
}

impl FilesBundle {
    pub fn file_count(&self) -> usize {
        self.education_certificates.len()
            + self.teaching_certificates.len()
            + usize::from(self.identity_document.is_some())
            + usize::from(self.cv_resume.is_some())
            + self.portfolio.len()
    }
}

/// Step 1 answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

/// Step 2 answers. GPA/grade is the only optional field on this step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationBackground {
    #[serde(default)]
    pub highest_qualification: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub graduation_year: Option<u16>,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub gpa_grade: String,
}

/// Step 3 answers. Subject and age-group selections are sets: the form offers
/// checkboxes, so a value is either selected or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingExperience {
    #[serde(default)]
    pub years_of_experience: Option<u8>,
    #[serde(default)]
    pub previous_tutoring: String,
    #[serde(default)]
    pub teaching_approach: String,
    #[serde(default)]
    pub subjects_expertise: BTreeSet<String>,
    #[serde(default)]
    pub age_groups: BTreeSet<String>,
}

/// Step 4 answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityAndRates {
    #[serde(default)]
    pub availability_hours: BTreeSet<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub preferred_mode: Option<TeachingMode>,
}

/// In-progress wizard answers, grouped by step. One instance per wizard
/// session; never persisted, destroyed when the wizard closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftForm {
    #[serde(default)]
    pub personal: PersonalInfo,
    #[serde(default)]
    pub education: EducationBackground,
    #[serde(default)]
    pub experience: TeachingExperience,
    #[serde(default)]
    pub availability: AvailabilityAndRates,
    #[serde(default)]
    pub files: FilesBundle,
}
