use serde::{Deserialize, Serialize};

use crate::domain::Person;

/// Response of `GET /persons`. `size` counts the whole filtered set, not just this page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonsApiResponse {
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountByLocationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByHeightQuery {
    pub min_height: f64,
}
