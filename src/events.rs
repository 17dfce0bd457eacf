//! Typed events pushed from the controllers to whatever renders them.

use log::debug;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    models::{TranscriptLine, Violation},
    session::CallStatus,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Lightweight, non-blocking notification.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Screen the session hands off to once it is over.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Route {
    Home,
    Feedback {
        #[serde(rename = "interviewId")]
        interview_id: String,
    },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Feedback { interview_id } => format!("/interview/{interview_id}/feedback"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum AppEvent {
    Notice(Notice),
    #[serde(rename_all = "camelCase")]
    ViolationRecorded {
        violation: Violation,
        count: usize,
        max: usize,
    },
    /// Blocking: the coding challenge is over because of proctoring.
    #[serde(rename_all = "camelCase")]
    ProctoringTerminated {
        message: String,
        description: String,
        violation_count: usize,
    },
    CallStatusChanged {
        status: CallStatus,
    },
    SpeakingChanged {
        speaking: bool,
    },
    TranscriptUpdated {
        line: TranscriptLine,
    },
    ChallengeOffered {
        title: String,
        difficulty: String,
        category: String,
    },
    #[serde(rename_all = "camelCase")]
    CodeSubmitted {
        language: String,
        violation_count: usize,
    },
    Navigate {
        route: Route,
    },
}

impl AppEvent {
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        AppEvent::Notice(Notice::new(level, message))
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);
}

/// Forwards events to an unbounded channel; a closed receiver drops them.
#[derive(Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }
}

/// Writes every event to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: AppEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => debug!("event {json}"),
            Err(err) => debug!("event {event:?} (unserializable: {err})"),
        }
    }
}
