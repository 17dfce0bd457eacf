use std::sync::Arc;

use anyhow::{bail, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, OnceCell};

use crate::{
    events::{AppEvent, EventSink, Notice, NoticeLevel, Route},
    models::{CodingQuestion, Interview, Role, TranscriptLine},
    proctoring::{ProctoringConfig, ProctoringMonitor},
    services::{
        CameraSource, DocumentStore, FrameDetector, ScoringService, VoiceEvent, VoiceInterface,
        VoiceMessage, VoiceSubscription,
    },
};

use super::{
    build_call_config, contains_trigger,
    feedback::{FeedbackPipeline, PipelineInput},
    CallStatus, CodingView, SessionPurpose, SessionSettings, SessionState,
};

/// Who is calling and about what.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub purpose: SessionPurpose,
    pub user_name: String,
    pub user_id: String,
    pub interview_id: Option<String>,
    /// Feedback document to overwrite when the interview is retaken.
    pub feedback_id: Option<String>,
    pub questions: Vec<String>,
}

/// External services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub voice: Arc<dyn VoiceInterface>,
    pub scoring: Arc<dyn ScoringService>,
    pub store: Arc<dyn DocumentStore>,
    pub camera: Arc<dyn CameraSource>,
    pub detector: Arc<dyn FrameDetector>,
    pub events: Arc<dyn EventSink>,
}

/// Drives one voice call from start to the hand-off screen.
#[derive(Clone)]
pub struct SessionOrchestrator {
    options: Arc<SessionOptions>,
    services: Collaborators,
    settings: Arc<SessionSettings>,
    proctoring: Arc<ProctoringConfig>,
    state: Arc<Mutex<SessionState>>,
    interview: Arc<Mutex<Option<Interview>>>,
    completion: Arc<OnceCell<Route>>,
    status: Arc<watch::Sender<CallStatus>>,
}

impl SessionOrchestrator {
    pub fn new(
        options: SessionOptions,
        services: Collaborators,
        settings: SessionSettings,
        proctoring: ProctoringConfig,
    ) -> Self {
        let (status, _) = watch::channel(CallStatus::Inactive);
        Self {
            options: Arc::new(options),
            services,
            settings: Arc::new(settings),
            proctoring: Arc::new(proctoring),
            state: Arc::new(Mutex::new(SessionState::new())),
            interview: Arc::new(Mutex::new(None)),
            completion: Arc::new(OnceCell::new()),
            status: Arc::new(status),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub fn status(&self) -> CallStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<CallStatus> {
        self.status.subscribe()
    }

    /// Fetches the interview record once and caches it for trigger lookups.
    ///
    /// Only interview sessions with an id load anything. A missing record or a
    /// failed fetch leaves the cache empty.
    pub async fn load_interview(&self) -> Option<Interview> {
        if self.options.purpose != SessionPurpose::Interview {
            return None;
        }
        let id = self.options.interview_id.as_deref()?;

        let mut cached = self.interview.lock().await;
        if cached.is_some() {
            return cached.clone();
        }

        match self.services.store.get_interview(id).await {
            Ok(Some(interview)) => {
                info!(
                    "interview {id} loaded (coding question: {})",
                    interview.coding_question.is_some()
                );
                *cached = Some(interview);
                cached.clone()
            }
            Ok(None) => {
                warn!("interview {id} not found");
                None
            }
            Err(err) => {
                error!("Error fetching interview: {err:?}");
                None
            }
        }
    }

    /// Connects the voice call. A failed start returns the session to inactive.
    pub async fn start_call(&self) -> Result<()> {
        self.state.lock().await.begin_connecting()?;
        self.set_status(CallStatus::Connecting);

        let coding_question = self.cached_coding_question().await;
        let config = build_call_config(&self.options, coding_question.as_ref(), &self.settings);

        if let Err(err) = self.services.voice.start(config).await {
            error!("failed to start voice call: {err:?}");
            let reverted = {
                let mut state = self.state.lock().await;
                state.abort_connecting();
                state.status
            };
            self.set_status(reverted);
            self.services.events.emit(AppEvent::Notice(
                Notice::new(NoticeLevel::Error, "Failed to start the call")
                    .with_description("Please check your connection and try again."),
            ));
            return Err(err.context("voice call did not start"));
        }

        info!("voice call connecting ({:?})", self.options.purpose);
        Ok(())
    }

    /// Applies one voice-interface event. Returns the hand-off route once the
    /// call has finished and its follow-up work is done.
    pub async fn handle_voice_event(&self, event: VoiceEvent) -> Option<Route> {
        match event {
            VoiceEvent::CallStart => {
                if self.state.lock().await.mark_active() {
                    info!("voice call active");
                    self.set_status(CallStatus::Active);
                }
                None
            }
            VoiceEvent::CallEnd => {
                if !self.state.lock().await.mark_finished() {
                    return None;
                }
                info!("voice call ended by remote");
                self.set_status(CallStatus::Finished);
                Some(self.complete().await)
            }
            VoiceEvent::Message(message) => {
                self.handle_message(message).await;
                None
            }
            VoiceEvent::SpeechStart => {
                self.set_speaking(true).await;
                None
            }
            VoiceEvent::SpeechEnd => {
                self.set_speaking(false).await;
                None
            }
            VoiceEvent::Error(message) => {
                error!("voice interface error: {message}");
                None
            }
        }
    }

    /// Ends the call from this side and runs the follow-up work.
    pub async fn disconnect(&self) -> Result<Route> {
        if !self.state.lock().await.mark_finished() {
            bail!("no call to disconnect");
        }
        self.set_status(CallStatus::Finished);

        if let Err(err) = self.services.voice.stop().await {
            warn!("voice interface did not stop cleanly: {err:?}");
        }
        Ok(self.complete().await)
    }

    /// Pumps voice events until the session is over and returns where to go next.
    pub async fn run(&self, mut subscription: VoiceSubscription) -> Route {
        let mut status = self.watch_status();
        loop {
            if *status.borrow_and_update() == CallStatus::Finished {
                break;
            }
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        if let Some(route) = self.handle_voice_event(event).await {
                            return route;
                        }
                    }
                    None => {
                        warn!("voice event stream closed, ending session");
                        if let Some(route) = self.handle_voice_event(VoiceEvent::CallEnd).await {
                            return route;
                        }
                        break;
                    }
                },
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        drop(subscription);
        self.complete().await
    }

    pub async fn accept_challenge(&self) -> Result<CodingView> {
        let question = self.state.lock().await.accept_challenge()?;
        info!("coding challenge '{}' accepted", question.title);

        let (monitor, signals) = ProctoringMonitor::new(
            (*self.proctoring).clone(),
            Arc::clone(&self.services.camera),
            Arc::clone(&self.services.detector),
            Arc::clone(&self.services.events),
        );
        Ok(CodingView::open(question, monitor, signals, Arc::clone(&self.services.events)).await)
    }

    pub async fn decline_challenge(&self) {
        self.state.lock().await.decline_challenge();
        info!("coding challenge declined");
    }

    /// Stops proctoring and keeps the code for scoring. The call carries on.
    /// Refused once the call has finished, since feedback has already run.
    pub async fn submit_code(&self, view: CodingView) -> Result<()> {
        let submission = view.into_submission();
        let language = submission.language.clone();
        let violation_count = submission.violations.len();

        self.state.lock().await.record_submission(submission)?;
        info!("code submitted in {language} with {violation_count} violation(s)");
        self.services.events.emit(AppEvent::CodeSubmitted {
            language,
            violation_count,
        });
        Ok(())
    }

    pub async fn close_coding_view(&self, view: CodingView) {
        view.close();
        self.state.lock().await.close_coding_view();
    }

    async fn handle_message(&self, message: VoiceMessage) {
        if !message.is_final_transcript() {
            return;
        }
        let Some(role) = Role::parse(&message.role) else {
            warn!("ignoring transcript with unknown role '{}'", message.role);
            return;
        };

        let line = TranscriptLine::new(role, message.transcript);
        let offer_open = {
            let mut state = self.state.lock().await;
            state.push_transcript(line.clone());
            state.can_offer_challenge()
        };
        self.services
            .events
            .emit(AppEvent::TranscriptUpdated { line: line.clone() });

        if role == Role::Assistant
            && self.options.purpose == SessionPurpose::Interview
            && offer_open
            && contains_trigger(&line.content, &self.settings.trigger_phrases)
        {
            self.offer_challenge().await;
        }
    }

    async fn offer_challenge(&self) {
        let Some(question) = self.cached_coding_question().await else {
            info!("challenge trigger heard but interview has no coding question");
            return;
        };

        let offered = {
            let mut state = self.state.lock().await;
            state.offer_challenge(question.clone())
        };
        if offered {
            info!("coding challenge '{}' offered", question.title);
            self.services.events.emit(AppEvent::ChallengeOffered {
                title: question.title,
                difficulty: question.difficulty,
                category: question.category,
            });
        }
    }

    async fn cached_coding_question(&self) -> Option<CodingQuestion> {
        self.interview
            .lock()
            .await
            .as_ref()
            .and_then(|interview| interview.coding_question.clone())
    }

    async fn set_speaking(&self, speaking: bool) {
        let changed = {
            let mut state = self.state.lock().await;
            let changed = state.is_speaking != speaking;
            state.is_speaking = speaking;
            changed
        };
        if changed {
            self.services
                .events
                .emit(AppEvent::SpeakingChanged { speaking });
        }
    }

    fn set_status(&self, status: CallStatus) {
        self.status.send_replace(status);
        self.services
            .events
            .emit(AppEvent::CallStatusChanged { status });
    }

    /// Runs the finish side effects exactly once; later callers get the same route.
    async fn complete(&self) -> Route {
        if self.status() != CallStatus::Finished {
            return Route::Home;
        }
        self.completion
            .get_or_init(|| async {
                let route = self.finish().await;
                info!("session complete, navigating to {}", route.path());
                self.services.events.emit(AppEvent::Navigate {
                    route: route.clone(),
                });
                route
            })
            .await
            .clone()
    }

    async fn finish(&self) -> Route {
        if self.options.purpose == SessionPurpose::Generate {
            return Route::Home;
        }

        let cached_question = self.cached_coding_question().await;
        let input = {
            let state = self.state.lock().await;
            PipelineInput {
                interview_id: self.options.interview_id.clone(),
                user_id: self.options.user_id.clone(),
                feedback_id: self.options.feedback_id.clone(),
                transcript: state.transcript.clone(),
                submission: state.submitted_code.clone(),
                question: state.coding_question.clone().or(cached_question),
            }
        };

        let pipeline = FeedbackPipeline::new(
            self.services.scoring.as_ref(),
            self.services.store.as_ref(),
            self.settings.scoring_timeout(),
        );
        let outcome = pipeline.run(input).await;

        {
            let mut state = self.state.lock().await;
            state.code_feedback = outcome.code_feedback;
            state.proctoring_feedback = outcome.proctoring_feedback;
        }

        match (outcome.feedback_id, self.options.interview_id.clone()) {
            (Some(_), Some(interview_id)) => Route::Feedback { interview_id },
            _ => {
                warn!("feedback was not saved, returning home");
                Route::Home
            }
        }
    }
}
