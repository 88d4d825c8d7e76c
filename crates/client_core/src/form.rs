//! Edit-form state: which mode a person form is opened in and what a submittable draft looks like.

use std::fmt;

use shared::domain::PersonDraft;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormMode {
    Create,
    Update,
    Read,
}

impl FormMode {
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Create => "New person",
            Self::Update => "Edit person",
            Self::Read => "Person",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid person: {}", join(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Client-side checks run before a draft is sent. The server still has the final word (422).
pub fn validate_draft(draft: &PersonDraft) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    let mut fail = |field, message| errors.push(FieldError { field, message });

    if draft.name.trim().is_empty() {
        fail("name", "must not be blank");
    }
    if !draft.coordinates.x.is_finite() {
        fail("coordinates.x", "must be a number");
    }
    if !draft.coordinates.y.is_finite() {
        fail("coordinates.y", "must be a number");
    }
    if !(draft.height.is_finite() && draft.height > 0.0) {
        fail("height", "must be greater than 0");
    }
    if draft.weight.is_some_and(|w| w <= 0) {
        fail("weight", "must be greater than 0");
    }
    if !draft.location.x.is_finite() {
        fail("location.x", "must be a number");
    }
    if draft.location.name.trim().is_empty() {
        fail("location.name", "must not be blank");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
