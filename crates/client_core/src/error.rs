//! Failure taxonomy for calls against the person and demography services.

use std::fmt;

use thiserror::Error;

/// Coarse cause of a failed call, derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 400: the client encoded filters, sort or payload incorrectly.
    BadRequest,
    /// 404: the referenced person no longer exists.
    NotFound,
    /// 422: the server rejected a create/update payload.
    Validation,
    /// 500.
    Server,
    /// Any other non-success status, or an undecodable body.
    Unexpected,
    /// No response at all (connect, DNS, reset).
    Transport,
}

impl ErrorCategory {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            422 => Self::Validation,
            500 => Self::Server,
            _ => Self::Unexpected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListPersons,
    CreatePerson,
    UpdatePerson,
    DeletePerson,
    AverageWeight,
    CountByLocation,
    PersonsByHeight,
    CountByHairColor,
    NationalityEyeColorPercentage,
}

impl Operation {
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreatePerson | Self::UpdatePerson | Self::DeletePerson
        )
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Self::ListPersons => "Failed to load the persons list",
            Self::CreatePerson => "Failed to create person",
            Self::UpdatePerson => "Failed to update person",
            Self::DeletePerson => "Failed to delete person",
            Self::AverageWeight => "Failed to get the average weight",
            Self::CountByLocation => "Failed to count persons by location",
            Self::PersonsByHeight => "Failed to get persons by height",
            Self::CountByHairColor => "Failed to count persons by hair color",
            Self::NationalityEyeColorPercentage => {
                "Failed to get the percentage by nationality and eye color"
            }
        }
    }

    /// Text shown to the user when this operation fails with `category`.
    pub fn user_message(self, category: ErrorCategory) -> &'static str {
        match category {
            ErrorCategory::BadRequest if self == Self::ListPersons => {
                "Invalid request parameters"
            }
            ErrorCategory::BadRequest => "Malformed request",
            ErrorCategory::NotFound if matches!(self, Self::UpdatePerson | Self::DeletePerson) => {
                "Person not found"
            }
            ErrorCategory::Validation if self.is_mutation() => "Validation failed",
            ErrorCategory::Server => "Internal server error",
            _ => self.fallback_message(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListPersons => "list persons",
            Self::CreatePerson => "create person",
            Self::UpdatePerson => "update person",
            Self::DeletePerson => "delete person",
            Self::AverageWeight => "average weight",
            Self::CountByLocation => "count by location",
            Self::PersonsByHeight => "persons by height",
            Self::CountByHairColor => "count by hair color",
            Self::NationalityEyeColorPercentage => "nationality/eye color percentage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{operation} failed with HTTP {status}: {detail}")]
    Status {
        operation: Operation,
        status: u16,
        detail: String,
    },
    #[error("{operation} failed: {detail}")]
    Transport { operation: Operation, detail: String },
    #[error("{operation} returned an undecodable body: {detail}")]
    Decode { operation: Operation, detail: String },
}

impl ClientError {
    pub fn status(operation: Operation, status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            operation,
            status,
            detail: detail.into(),
        }
    }

    pub fn transport(operation: Operation, detail: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            detail: detail.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Status { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Decode { operation, .. } => *operation,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Status { status, .. } => ErrorCategory::from_status(*status),
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Decode { .. } => ErrorCategory::Unexpected,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.operation().user_message(self.category())
    }
}
