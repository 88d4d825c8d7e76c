use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the person and demography services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<FieldViolation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field: String,
    #[serde(default)]
    pub rejected_value: Option<serde_json::Value>,
    pub message: String,
}

impl ErrorResponse {
    /// Human readable one-line summary, including field violations when present.
    pub fn summary(&self) -> String {
        let mut out = if self.message.is_empty() {
            self.error.clone()
        } else {
            self.message.clone()
        };
        if !self.validation_errors.is_empty() {
            let fields = self
                .validation_errors
                .iter()
                .map(|v| format!("{}: {}", v.field, v.message))
                .collect::<Vec<_>>()
                .join("; ");
            if out.is_empty() {
                out = fields;
            } else {
                out = format!("{out} ({fields})");
            }
        }
        out
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
