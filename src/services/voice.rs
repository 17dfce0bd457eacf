//! Voice-call collaborator and handle-based event subscriptions.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Raw `message` payload from the voice interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub transcript_type: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub transcript: String,
}

impl VoiceMessage {
    pub fn final_transcript(role: &str, transcript: impl Into<String>) -> Self {
        Self {
            kind: "transcript".into(),
            transcript_type: "final".into(),
            role: role.into(),
            transcript: transcript.into(),
        }
    }

    pub fn is_final_transcript(&self) -> bool {
        self.kind == "transcript" && self.transcript_type == "final"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    CallStart,
    CallEnd,
    Message(VoiceMessage),
    SpeechStart,
    SpeechEnd,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Question-generation workflow.
    Workflow(String),
    /// Interviewer assistant.
    Assistant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallConfig {
    pub target: CallTarget,
    pub variable_values: BTreeMap<String, String>,
}

#[async_trait]
pub trait VoiceInterface: Send + Sync {
    async fn start(&self, config: CallConfig) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    /// Registers a listener. Dropping the returned handle unsubscribes it.
    fn subscribe(&self) -> VoiceSubscription;
}

/// Receiving end of a voice-event subscription.
pub struct VoiceSubscription {
    events: mpsc::UnboundedReceiver<VoiceEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl VoiceSubscription {
    pub fn new(
        events: mpsc::UnboundedReceiver<VoiceEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
        }
    }

    pub async fn recv(&mut self) -> Option<VoiceEvent> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<VoiceEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for VoiceSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

type Subscribers = Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<VoiceEvent>>>>;

/// Fan-out of voice events to any number of subscriptions, for adapters that
/// receive events from a single callback.
#[derive(Clone, Default)]
pub struct VoiceEventBus {
    subscribers: Subscribers,
    next_id: Arc<AtomicU64>,
}

impl VoiceEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> VoiceSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        lock(&self.subscribers).insert(id, sender);

        let subscribers = Arc::clone(&self.subscribers);
        VoiceSubscription::new(receiver, move || {
            lock(&subscribers).remove(&id);
        })
    }

    pub fn publish(&self, event: VoiceEvent) {
        let mut guard = lock(&self.subscribers);
        guard.retain(|_, sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}

fn lock(
    subscribers: &Subscribers,
) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<VoiceEvent>>> {
    match subscribers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
