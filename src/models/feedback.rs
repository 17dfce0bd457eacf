use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub name: String,
    pub score: u32,
    pub comment: String,
}

/// Structured result of scoring a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAssessment {
    pub total_score: u32,
    pub category_scores: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
}

impl TranscriptAssessment {
    /// Rejects scores outside 0–100 before they reach the store.
    pub fn validate(&self) -> Result<()> {
        if self.total_score > MAX_SCORE {
            bail!("total score {} exceeds {}", self.total_score, MAX_SCORE);
        }
        if let Some(category) = self
            .category_scores
            .iter()
            .find(|category| category.score > MAX_SCORE)
        {
            bail!(
                "category '{}' score {} exceeds {}",
                category.name,
                category.score,
                MAX_SCORE
            );
        }
        Ok(())
    }
}

/// Persisted feedback document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub interview_id: String,
    pub user_id: String,
    pub total_score: u32,
    pub category_scores: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
    /// ISO-8601.
    pub created_at: String,
    pub code_feedback: Option<String>,
    pub proctoring_feedback: Option<String>,
}

impl FeedbackRecord {
    pub fn from_assessment(
        interview_id: String,
        user_id: String,
        assessment: TranscriptAssessment,
        created_at: String,
        code_feedback: Option<String>,
        proctoring_feedback: Option<String>,
    ) -> Self {
        Self {
            interview_id,
            user_id,
            total_score: assessment.total_score,
            category_scores: assessment.category_scores,
            strengths: assessment.strengths,
            areas_for_improvement: assessment.areas_for_improvement,
            final_assessment: assessment.final_assessment,
            created_at,
            code_feedback,
            proctoring_feedback,
        }
    }
}

/// A stored feedback document together with its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    #[serde(flatten)]
    pub record: FeedbackRecord,
}
