use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CodingQuestion, TranscriptAssessment, TranscriptLine, Violation};

/// Hosted model that turns session artefacts into feedback text.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score_code(&self, code: &str, language: &str, question: &CodingQuestion)
        -> Result<String>;

    async fn score_proctoring(&self, violations: &[Violation]) -> Result<String>;

    async fn score_transcript(
        &self,
        transcript: &[TranscriptLine],
        code_feedback: Option<&str>,
    ) -> Result<TranscriptAssessment>;

    /// A nudge for the candidate that does not give the solution away.
    async fn hint(&self, question: &CodingQuestion) -> Result<String>;
}
