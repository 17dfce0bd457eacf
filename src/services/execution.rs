use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ExecutionRequest {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionStatus {
    pub id: u32,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    pub message: String,
    pub time: String,
    pub memory: String,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    /// What the editor shows: stdout, else stderr, else a placeholder.
    pub fn display_output(&self) -> &str {
        if !self.stdout.is_empty() {
            &self.stdout
        } else if !self.stderr.is_empty() {
            &self.stderr
        } else {
            "No output"
        }
    }
}

/// Remote sandbox used by the editor's "run" action only.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult>;
}
