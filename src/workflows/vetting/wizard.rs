use std::sync::Arc;

use tracing::debug;

use super::domain::{ApplicationRecord, UserId};
use super::draft::DraftForm;
use super::repository::RecordStore;
use super::service::{TutorVettingService, VettingServiceError};
use super::storage::BlobStorage;
use super::validator::{validate_step, ValidationError, WizardStep};

/// Where the host page navigates after a successful submission.
pub const SUBMITTED_REDIRECT: &str = "/dashboard/tutor?application=submitted";

/// One-way signals consumed by the page shell hosting the wizard.
pub trait NavigationHost: Send + Sync {
    fn close(&self);
    fn on_success(&self, redirect: &str);
}

/// Error raised by wizard-level operations.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("submission is only available from the review step (currently at '{}')", .step.title())]
    NotAtReview { step: WizardStep },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] VettingServiceError),
}

/// State machine driving the six-step vetting wizard.
///
/// Holds the draft and the current step; forward navigation is gated by the
/// step validator, backward navigation never is. Submission delegates to the
/// vetting service and reports the outcome to the navigation host. A failed
/// submission leaves the wizard open at the review step with the draft intact
/// so the user may retry; the retry re-runs every upload, so documents stored
/// by an earlier partial attempt stay behind under their old random names.
pub struct VettingWizard<S, R> {
    user_id: UserId,
    service: Arc<TutorVettingService<S, R>>,
    step: WizardStep,
    draft: DraftForm,
    last_error: Option<String>,
    open: bool,
}

impl<S, R> VettingWizard<S, R>
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    /// Open a wizard with an empty draft. There is no resume-from-draft: a
    /// reopened wizard always starts over.
    pub fn open(user_id: UserId, service: Arc<TutorVettingService<S, R>>) -> Self {
        Self {
            user_id,
            service,
            step: WizardStep::PersonalInfo,
            draft: DraftForm::default(),
            last_error: None,
            open: true,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn draft(&self) -> &DraftForm {
        &self.draft
    }

    /// Mutable access for edits on the active step. Only one step is rendered
    /// at a time, so the UI cannot produce concurrent edits elsewhere.
    pub fn draft_mut(&mut self) -> &mut DraftForm {
        &mut self.draft
    }

    /// Move forward one step if the current step's required fields are filled.
    /// No-op at the review step.
    pub fn advance(&mut self) -> Result<WizardStep, ValidationError> {
        validate_step(self.step, &self.draft)?;
        if let Some(next) = self.step.next() {
            debug!(from = self.step.title(), to = next.title(), "wizard advanced");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move back one step. Always permitted; no-op at the first step.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Submit the draft. Permitted only at the review step.
    ///
    /// On success the wizard closes, the draft is destroyed, and the host is
    /// told to navigate to the confirmation view. On any failure the wizard
    /// stays open at the review step with the error message recorded and the
    /// draft untouched.
    pub fn submit(&mut self, host: &dyn NavigationHost) -> Result<ApplicationRecord, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotAtReview { step: self.step });
        }

        match self.service.submit(&self.user_id, &self.draft) {
            Ok(record) => {
                self.last_error = None;
                self.open = false;
                self.draft = DraftForm::default();
                host.close();
                host.on_success(SUBMITTED_REDIRECT);
                Ok(record)
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(WizardError::Submission(err))
            }
        }
    }

    /// External close from the host page. Destroys the draft regardless of
    /// progress; in-flight submissions are not cancelled by closing the UI.
    pub fn close(&mut self) {
        self.open = false;
        self.draft = DraftForm::default();
        self.last_error = None;
    }
}
