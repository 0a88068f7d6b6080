//! Custom item intake
//!
//! State machine for the "add a custom item" form:
//!
//! ```text
//! Closed -> Open -> Submitting -> Closed
//!                       |
//!                       +-------> OpenWithErrors -> Submitting ...
//! ```
//!
//! The intake only tracks state. The selector drives the remote call and
//! feeds the classified outcome back in.

use crate::error::SelectorError;
use crate::item::Item;
use crate::remote::{CreateResponse, FieldErrors};
use serde::{Deserialize, Serialize};

/// General message used when the remote action gives no reason
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// User-entered custom item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomItemDraft {
    /// Display name
    pub name: String,
    /// Uri (also becomes the id)
    pub uri: String,
    /// Description
    pub description: String,
}

impl CustomItemDraft {
    /// Create draft
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            description: description.into(),
        }
    }

    /// Copy with surrounding whitespace removed from every field
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.uri.trim(), self.description.trim())
    }

    /// Whether every field is non-blank after trimming
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.uri, &self.description]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Normalized item built from the trimmed draft
    #[must_use]
    pub fn to_item(&self) -> Item {
        let trimmed = self.trimmed();
        Item::new(trimmed.uri, trimmed.name, trimmed.description)
    }
}

/// Intake form state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IntakeState {
    /// Form hidden
    #[default]
    Closed,
    /// Form shown, no errors
    Open,
    /// Create action pending
    Submitting,
    /// Form shown with errors from the last attempt
    OpenWithErrors(FieldErrors),
}

impl IntakeState {
    /// Whether the form is visible and accepts a submission
    #[inline]
    #[must_use]
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Self::Open | Self::OpenWithErrors(_))
    }
}

/// Result of gating a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate {
    /// Some field is blank; nothing was sent
    Incomplete,
    /// Trimmed draft ready for the create action
    Ready(CustomItemDraft),
}

/// Classified create response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Caller must navigate away
    Redirect(String),
    /// Creation failed, or succeeded with embedded errors
    Failed(FieldErrors),
    /// Record stored cleanly
    Created,
}

/// Classify a create response
///
/// A redirect wins over everything else. A success envelope whose record
/// carries field errors counts as a failure.
#[must_use]
pub fn classify_response(response: CreateResponse) -> CreateOutcome {
    if let Some(target) = response.redirect {
        return CreateOutcome::Redirect(target);
    }

    if !response.success {
        return CreateOutcome::Failed(with_general_fallback(response.errors));
    }

    match response.data.and_then(|record| record.errors) {
        Some(errors) if !errors.is_empty() => CreateOutcome::Failed(errors),
        _ => CreateOutcome::Created,
    }
}

fn with_general_fallback(mut errors: FieldErrors) -> FieldErrors {
    if errors.is_empty() {
        errors.general = Some(GENERIC_FAILURE.to_string());
    }
    errors
}

/// Custom item form state and transient draft
#[derive(Debug, Clone, Default)]
pub struct CustomIntake {
    state: IntakeState,
    draft: CustomItemDraft,
}

impl CustomIntake {
    /// Create closed intake
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &IntakeState {
        &self.state
    }

    /// Draft from the last submission attempt
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &CustomItemDraft {
        &self.draft
    }

    /// Show the form; returns false when it was not closed
    pub fn open(&mut self) -> bool {
        if self.state == IntakeState::Closed {
            self.state = IntakeState::Open;
            true
        } else {
            false
        }
    }

    /// Hide the form and clear the draft
    pub fn cancel(&mut self) {
        self.state = IntakeState::Closed;
        self.draft = CustomItemDraft::default();
    }

    /// Gate a submission
    ///
    /// # Errors
    /// - `SelectorError::IntakeNotOpen` if the form is closed
    /// - `SelectorError::SubmissionInProgress` if a create call is pending
    pub fn begin_submit(&mut self, draft: CustomItemDraft) -> Result<SubmitGate, SelectorError> {
        match self.state {
            IntakeState::Closed => return Err(SelectorError::IntakeNotOpen),
            IntakeState::Submitting => return Err(SelectorError::SubmissionInProgress),
            IntakeState::Open | IntakeState::OpenWithErrors(_) => {}
        }

        let complete = draft.is_complete();
        self.draft = draft;
        if !complete {
            return Ok(SubmitGate::Incomplete);
        }

        self.state = IntakeState::Submitting;
        Ok(SubmitGate::Ready(self.draft.trimmed()))
    }

    /// Create failed; keep the draft and show errors
    ///
    /// Returns the errors now on the form.
    pub fn finish_failure(&mut self, errors: FieldErrors) -> FieldErrors {
        let shown = with_general_fallback(errors);
        self.state = IntakeState::OpenWithErrors(shown.clone());
        shown
    }

    /// Create succeeded or redirected; close and clear
    pub fn finish(&mut self) {
        self.cancel();
    }
}
