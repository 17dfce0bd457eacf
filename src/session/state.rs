use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{CodingQuestion, SubmittedCode, TranscriptLine};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CallStatus {
    #[default]
    Inactive,
    Connecting,
    Active,
    /// Terminal. A new attempt needs a new orchestrator.
    Finished,
}

/// Why the call is being made.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPurpose {
    /// Onboarding call that generates interview questions; never scored.
    Generate,
    Interview,
}

impl SessionPurpose {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "generate" => Some(SessionPurpose::Generate),
            "interview" => Some(SessionPurpose::Interview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: CallStatus,
    pub transcript: Vec<TranscriptLine>,
    pub is_speaking: bool,
    pub coding_question: Option<CodingQuestion>,
    pub coding_challenge_offered: bool,
    pub coding_challenge_accepted: bool,
    pub submitted_code: Option<SubmittedCode>,
    pub code_feedback: Option<String>,
    pub proctoring_feedback: Option<String>,
    /// Latched on the first offer; the challenge is never offered again.
    #[serde(skip)]
    pub challenge_triggered: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_connecting(&mut self) -> Result<()> {
        if self.status != CallStatus::Inactive {
            bail!("cannot start a call while {:?}", self.status);
        }
        self.status = CallStatus::Connecting;
        Ok(())
    }

    /// Rolls a failed start back so the user can try again.
    pub fn abort_connecting(&mut self) {
        if self.status == CallStatus::Connecting {
            self.status = CallStatus::Inactive;
        }
    }

    /// Returns true when this call moved the session to `Active`.
    pub fn mark_active(&mut self) -> bool {
        if self.status == CallStatus::Connecting {
            self.status = CallStatus::Active;
            return true;
        }
        false
    }

    /// Returns true when this call moved the session to `Finished`.
    pub fn mark_finished(&mut self) -> bool {
        match self.status {
            CallStatus::Connecting | CallStatus::Active => {
                self.status = CallStatus::Finished;
                true
            }
            CallStatus::Inactive | CallStatus::Finished => false,
        }
    }

    pub fn push_transcript(&mut self, line: TranscriptLine) {
        self.transcript.push(line);
    }

    pub fn last_message(&self) -> Option<&str> {
        self.transcript.last().map(|line| line.content.as_str())
    }

    /// Whether a trigger phrase may still open the challenge.
    pub fn can_offer_challenge(&self) -> bool {
        !self.challenge_triggered
            && !self.coding_challenge_offered
            && !self.coding_challenge_accepted
    }

    pub fn offer_challenge(&mut self, question: CodingQuestion) -> bool {
        if !self.can_offer_challenge() {
            return false;
        }
        self.coding_question = Some(question);
        self.coding_challenge_offered = true;
        self.challenge_triggered = true;
        true
    }

    pub fn accept_challenge(&mut self) -> Result<CodingQuestion> {
        if !self.coding_challenge_offered {
            bail!("no coding challenge is on offer");
        }
        let Some(question) = self.coding_question.clone() else {
            bail!("coding challenge offered without a question");
        };
        self.coding_challenge_offered = false;
        self.coding_challenge_accepted = true;
        Ok(question)
    }

    pub fn decline_challenge(&mut self) {
        self.coding_challenge_offered = false;
    }

    pub fn close_coding_view(&mut self) {
        self.coding_challenge_accepted = false;
    }

    pub fn record_submission(&mut self, submission: SubmittedCode) -> Result<()> {
        if self.status == CallStatus::Finished {
            bail!("call has already ended; the submission would not be scored");
        }
        if self.submitted_code.is_some() {
            bail!("code has already been submitted for this session");
        }
        self.submitted_code = Some(submission);
        self.coding_challenge_accepted = false;
        Ok(())
    }
}
