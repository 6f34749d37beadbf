use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::draft::{DraftForm, AGE_GROUPS, SUBJECTS};

/// Earliest graduation year the education step accepts.
const MIN_GRADUATION_YEAR: u16 = 1950;

/// The six ordered wizard steps. Indices are 1-based to match the step counter
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalInfo,
    Education,
    Experience,
    Availability,
    Documents,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::PersonalInfo,
        WizardStep::Education,
        WizardStep::Experience,
        WizardStep::Availability,
        WizardStep::Documents,
        WizardStep::Review,
    ];

    pub const fn index(self) -> u8 {
        match self {
            WizardStep::PersonalInfo => 1,
            WizardStep::Education => 2,
            WizardStep::Experience => 3,
            WizardStep::Availability => 4,
            WizardStep::Documents => 5,
            WizardStep::Review => 6,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.index() == index)
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Information",
            WizardStep::Education => "Education Background",
            WizardStep::Experience => "Teaching Experience",
            WizardStep::Availability => "Availability & Rates",
            WizardStep::Documents => "Document Upload",
            WizardStep::Review => "Review & Submit",
        }
    }

    /// The following step, or `None` at the review step.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, or `None` at the first step.
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

/// Raised when a step's required fields are not all filled in.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("'{}' is incomplete: missing {}", .step.title(), .fields.join(", "))]
    Incomplete {
        step: WizardStep,
        fields: Vec<&'static str>,
    },
    #[error(
        "graduation year {found} is out of range ({MIN_GRADUATION_YEAR}..={latest})",
        latest = .latest
    )]
    GraduationYearOutOfRange { found: u16, latest: u16 },
    #[error("'{value}' is not one of the offered {field} choices")]
    UnknownSelection { field: &'static str, value: String },
}

/// Per-step completeness check gating forward navigation.
///
/// Pure function over the draft; it gates `advance()` only. Nothing stops a
/// caller that manipulates step state directly from reaching submission with
/// earlier steps incomplete, which is why the HTTP boundary runs
/// [`validate_draft`] instead.
pub fn validate_step(step: WizardStep, draft: &DraftForm) -> Result<(), ValidationError> {
    let mut missing = Vec::new();

    match step {
        WizardStep::PersonalInfo => {
            require(&mut missing, "full_name", !draft.personal.full_name.trim().is_empty());
            require(&mut missing, "phone", !draft.personal.phone.trim().is_empty());
            require(&mut missing, "address", !draft.personal.address.trim().is_empty());
            require(&mut missing, "date_of_birth", draft.personal.date_of_birth.is_some());
        }
        WizardStep::Education => {
            let education = &draft.education;
            require(
                &mut missing,
                "highest_qualification",
                !education.highest_qualification.trim().is_empty(),
            );
            require(&mut missing, "institution", !education.institution.trim().is_empty());
            require(&mut missing, "graduation_year", education.graduation_year.is_some());
            require(
                &mut missing,
                "field_of_study",
                !education.field_of_study.trim().is_empty(),
            );
            if let Some(year) = education.graduation_year {
                let latest = current_year();
                if year < MIN_GRADUATION_YEAR || year > latest {
                    return Err(ValidationError::GraduationYearOutOfRange { found: year, latest });
                }
            }
        }
        WizardStep::Experience => {
            let experience = &draft.experience;
            require(
                &mut missing,
                "years_of_experience",
                experience.years_of_experience.is_some(),
            );
            require(
                &mut missing,
                "teaching_approach",
                !experience.teaching_approach.trim().is_empty(),
            );
            require(
                &mut missing,
                "subjects_expertise",
                !experience.subjects_expertise.is_empty(),
            );
            require(&mut missing, "age_groups", !experience.age_groups.is_empty());
            // The form offers fixed checkbox catalogs; anything else is a
            // hand-crafted payload.
            if let Some(value) = first_unknown(&experience.subjects_expertise, SUBJECTS) {
                return Err(ValidationError::UnknownSelection {
                    field: "subjects_expertise",
                    value,
                });
            }
            if let Some(value) = first_unknown(&experience.age_groups, AGE_GROUPS) {
                return Err(ValidationError::UnknownSelection {
                    field: "age_groups",
                    value,
                });
            }
        }
        WizardStep::Availability => {
            let availability = &draft.availability;
            require(
                &mut missing,
                "availability_hours",
                !availability.availability_hours.is_empty(),
            );
            require(
                &mut missing,
                "hourly_rate",
                availability.hourly_rate.is_some_and(|rate| rate > 0.0),
            );
            require(&mut missing, "preferred_mode", availability.preferred_mode.is_some());
        }
        WizardStep::Documents => {
            let files = &draft.files;
            require(
                &mut missing,
                "education_certificates",
                !files.education_certificates.is_empty(),
            );
            require(&mut missing, "identity_document", files.identity_document.is_some());
            require(&mut missing, "cv_resume", files.cv_resume.is_some());
        }
        WizardStep::Review => {}
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Incomplete { step, fields: missing })
    }
}

/// Validate every data step at once. Used at the submission boundary, where
/// the step-at-a-time gating of the wizard cannot be assumed.
pub fn validate_draft(draft: &DraftForm) -> Result<(), ValidationError> {
    for step in WizardStep::ALL {
        validate_step(step, draft)?;
    }
    Ok(())
}

fn first_unknown(
    selected: &std::collections::BTreeSet<String>,
    catalog: &[&str],
) -> Option<String> {
    selected
        .iter()
        .find(|value| !catalog.contains(&value.as_str()))
        .cloned()
}

fn require(missing: &mut Vec<&'static str>, field: &'static str, present: bool) {
    if !present {
        missing.push(field);
    }
}

fn current_year() -> u16 {
    u16::try_from(Utc::now().year()).unwrap_or(u16::MAX)
}
