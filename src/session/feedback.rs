//! Scoring and persistence run once a scored interview call has finished.

use std::{future::Future, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info, warn};

use crate::{
    models::{CodingQuestion, FeedbackRecord, SubmittedCode, TranscriptLine},
    services::{DocumentStore, ScoringService},
};

pub struct PipelineInput {
    pub interview_id: Option<String>,
    pub user_id: String,
    /// Existing feedback document to overwrite, if any.
    pub feedback_id: Option<String>,
    pub transcript: Vec<TranscriptLine>,
    pub submission: Option<SubmittedCode>,
    pub question: Option<CodingQuestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub code_feedback: Option<String>,
    pub proctoring_feedback: Option<String>,
    /// Present only when the record was stored.
    pub feedback_id: Option<String>,
}

pub struct FeedbackPipeline<'a> {
    scoring: &'a dyn ScoringService,
    store: &'a dyn DocumentStore,
    timeout: Duration,
}

impl<'a> FeedbackPipeline<'a> {
    pub fn new(
        scoring: &'a dyn ScoringService,
        store: &'a dyn DocumentStore,
        timeout: Duration,
    ) -> Self {
        Self {
            scoring,
            store,
            timeout,
        }
    }

    /// Runs the pipeline once. Code and proctoring feedback degrade to `None`
    /// on failure; both settle before anything is written.
    pub async fn run(&self, input: PipelineInput) -> PipelineOutcome {
        let code_request = async {
            match (input.submission.as_ref(), input.question.as_ref()) {
                (Some(submission), Some(question)) => {
                    self.guarded(
                        "code feedback",
                        self.scoring
                            .score_code(&submission.code, &submission.language, question),
                    )
                    .await
                }
                _ => None,
            }
        };
        let proctoring_request = async {
            match input.submission.as_ref() {
                Some(submission) if !submission.violations.is_empty() => {
                    self.guarded(
                        "proctoring feedback",
                        self.scoring.score_proctoring(&submission.violations),
                    )
                    .await
                }
                _ => None,
            }
        };
        let (code_feedback, proctoring_feedback) = tokio::join!(code_request, proctoring_request);

        let feedback_id = match self
            .persist(&input, code_feedback.clone(), proctoring_feedback.clone())
            .await
        {
            Ok(id) => {
                info!("feedback {id} stored");
                Some(id)
            }
            Err(err) => {
                error!("Error saving feedback: {err:?}");
                None
            }
        };

        PipelineOutcome {
            code_feedback,
            proctoring_feedback,
            feedback_id,
        }
    }

    async fn guarded<F>(&self, what: &str, request: F) -> Option<String>
    where
        F: Future<Output = Result<String>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(err)) => {
                error!("Error generating {what}: {err:?}");
                None
            }
            Err(_) => {
                warn!("{what} timed out after {}ms", self.timeout.as_millis());
                None
            }
        }
    }

    async fn persist(
        &self,
        input: &PipelineInput,
        code_feedback: Option<String>,
        proctoring_feedback: Option<String>,
    ) -> Result<String> {
        let interview_id = input
            .interview_id
            .clone()
            .ok_or_else(|| anyhow!("interview session has no interview id"))?;

        let assessment = tokio::time::timeout(
            self.timeout,
            self.scoring
                .score_transcript(&input.transcript, code_feedback.as_deref()),
        )
        .await
        .map_err(|_| anyhow!("transcript scoring timed out"))?
        .context("transcript scoring failed")?;
        assessment.validate()?;

        let record = FeedbackRecord::from_assessment(
            interview_id,
            input.user_id.clone(),
            assessment,
            Utc::now().to_rfc3339(),
            code_feedback,
            proctoring_feedback,
        );
        self.store
            .put_feedback(input.feedback_id.as_deref(), &record)
            .await
            .context("failed to store feedback")
    }
}
