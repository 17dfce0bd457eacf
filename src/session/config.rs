use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const GENERATE_WORKFLOW_ENV: &str = "MOCKVIEW_GENERATE_WORKFLOW_ID";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Phrases in an assistant line that open the coding challenge.
    pub trigger_phrases: Vec<String>,

    /// Upper bound on each scoring request of the feedback pipeline.
    pub scoring_timeout_ms: u64,

    /// Voice assistant that conducts scored interviews.
    pub interviewer_assistant_id: String,

    /// Voice workflow used by question-generation calls.
    pub generate_workflow_id: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            trigger_phrases: vec!["coding challenge".to_string()],
            scoring_timeout_ms: 30_000,
            interviewer_assistant_id: "interviewer".to_string(),
            generate_workflow_id: String::new(),
        }
    }
}

impl SessionSettings {
    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_millis(self.scoring_timeout_ms)
    }

    /// Applies environment overrides on top of stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(workflow_id) = std::env::var(GENERATE_WORKFLOW_ENV) {
            if !workflow_id.trim().is_empty() {
                self.generate_workflow_id = workflow_id.trim().to_string();
            }
        }
        self
    }
}
