use serde::{Deserialize, Serialize};

use super::Violation;

/// Code handed over by the coding view, with a copy of the violations recorded
/// while it was open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedCode {
    pub code: String,
    pub language: String,
    pub violations: Vec<Violation>,
}
