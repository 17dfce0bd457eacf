//! Interview documents and the coding question embedded in them.
//!
//! Field names follow the persisted document schema (camelCase, `_id` for the
//! question id), so records written by other clients deserialize unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodingExample {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Externally generated coding question. Treated as an opaque, immutable payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodingQuestion {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    #[serde(default)]
    pub examples: Vec<CodingExample>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    /// Milliseconds.
    #[serde(default)]
    pub time_limit: u64,
    /// Kilobytes.
    #[serde(default)]
    pub memory_limit: u64,
}

impl CodingQuestion {
    /// Input of the first example, used as stdin for "run".
    pub fn first_example_input(&self) -> Option<&str> {
        self.examples.first().map(|example| example.input.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub coding_question: Option<CodingQuestion>,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub cover_image: String,
    /// ISO-8601.
    pub created_at: String,
}
