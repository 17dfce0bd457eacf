use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a proctoring violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Camera,
    Eyes,
    Phone,
    Face,
    Tab,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Camera => "camera",
            ViolationKind::Eyes => "eyes",
            ViolationKind::Phone => "phone",
            ViolationKind::Face => "face",
            ViolationKind::Tab => "tab",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded violation. Never mutated after it is appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl Violation {
    pub fn new(kind: ViolationKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}
