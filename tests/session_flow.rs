mod common;

use std::sync::{atomic::Ordering, Arc};

use common::{
    attentive_face, coding_question, interview, FakeCamera, FakeExecutor, FakeScoring, FakeVoice,
    MemoryStore, RecordingSink, ScriptedDetector,
};
use mockview::{
    models::ViolationKind,
    services::{CallTarget, VoiceEvent, VoiceInterface, VoiceMessage},
    AppEvent, CallStatus, Collaborators, Language, ProctoringConfig, Route, SessionOptions,
    SessionOrchestrator, SessionPurpose, SessionSettings, Visibility,
};

struct Rig {
    orchestrator: SessionOrchestrator,
    voice: Arc<FakeVoice>,
    scoring: Arc<FakeScoring>,
    store: Arc<MemoryStore>,
    camera: Arc<FakeCamera>,
    sink: Arc<RecordingSink>,
}

fn rig(purpose: SessionPurpose, store: MemoryStore, scoring: FakeScoring, voice: FakeVoice) -> Rig {
    let voice = Arc::new(voice);
    let scoring = Arc::new(scoring);
    let store = Arc::new(store);
    let camera = Arc::new(FakeCamera::default());
    let sink = Arc::new(RecordingSink::default());

    let options = SessionOptions {
        purpose,
        user_name: "Ada".into(),
        user_id: "u1".into(),
        interview_id: match purpose {
            SessionPurpose::Interview => Some("i1".into()),
            SessionPurpose::Generate => None,
        },
        feedback_id: None,
        questions: vec!["Tell me about yourself".into()],
    };
    let services = Collaborators {
        voice: voice.clone(),
        scoring: scoring.clone(),
        store: store.clone(),
        camera: camera.clone(),
        detector: Arc::new(ScriptedDetector::new(vec![attentive_face()])),
        events: sink.clone(),
    };
    let settings = SessionSettings {
        generate_workflow_id: "wf-generate".into(),
        ..Default::default()
    };

    Rig {
        orchestrator: SessionOrchestrator::new(
            options,
            services,
            settings,
            ProctoringConfig::default(),
        ),
        voice,
        scoring,
        store,
        camera,
        sink,
    }
}

fn interview_rig(with_question: bool) -> Rig {
    let question = with_question.then(coding_question);
    rig(
        SessionPurpose::Interview,
        MemoryStore::with_interview(interview(question)),
        FakeScoring::default(),
        FakeVoice::default(),
    )
}

fn assistant(text: &str) -> VoiceEvent {
    VoiceEvent::Message(VoiceMessage::final_transcript("assistant", text))
}

fn user(text: &str) -> VoiceEvent {
    VoiceEvent::Message(VoiceMessage::final_transcript("user", text))
}

async fn connect(rig: &Rig) {
    rig.orchestrator.load_interview().await;
    rig.orchestrator.start_call().await.unwrap();
    assert!(rig
        .orchestrator
        .handle_voice_event(VoiceEvent::CallStart)
        .await
        .is_none());
    assert_eq!(rig.orchestrator.status(), CallStatus::Active);
}

fn feedback_route() -> Route {
    Route::Feedback {
        interview_id: "i1".into(),
    }
}

#[tokio::test]
async fn generate_call_never_runs_the_feedback_pipeline() {
    let rig = rig(
        SessionPurpose::Generate,
        MemoryStore::default(),
        FakeScoring::default(),
        FakeVoice::default(),
    );
    connect(&rig).await;
    rig.orchestrator.handle_voice_event(user("I want a Rust role")).await;

    let route = rig.orchestrator.handle_voice_event(VoiceEvent::CallEnd).await;

    assert_eq!(route, Some(Route::Home));
    assert_eq!(rig.scoring.transcript_calls.load(Ordering::SeqCst), 0);
    assert_eq!(rig.scoring.code_calls.load(Ordering::SeqCst), 0);
    assert!(rig.store.saved().is_empty());

    let started = rig.voice.started.lock().unwrap().clone();
    assert_eq!(started[0].target, CallTarget::Workflow("wf-generate".into()));
    assert_eq!(started[0].variable_values["username"], "Ada");
}

#[tokio::test]
async fn interview_without_submission_still_persists_feedback() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator.handle_voice_event(assistant("Tell me about yourself")).await;
    rig.orchestrator.handle_voice_event(user("I build backends")).await;

    let route = rig.orchestrator.handle_voice_event(VoiceEvent::CallEnd).await;

    assert_eq!(route, Some(feedback_route()));
    let saved = rig.store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1.code_feedback, None);
    assert_eq!(saved[0].1.proctoring_feedback, None);
    assert_eq!(saved[0].1.interview_id, "i1");
    assert_eq!(rig.scoring.code_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        rig.sink.count(|event| matches!(event, AppEvent::Navigate { .. })),
        1
    );

    let config = rig.voice.started.lock().unwrap()[0].clone();
    assert_eq!(config.target, CallTarget::Assistant("interviewer".into()));
    assert!(config.variable_values["codingQuestion"].contains("Two Sum"));
}

#[tokio::test]
async fn trigger_without_a_stored_question_is_a_silent_no_op() {
    let rig = interview_rig(false);
    connect(&rig).await;

    rig.orchestrator
        .handle_voice_event(assistant("Let's do a coding challenge now"))
        .await;

    let state = rig.orchestrator.snapshot().await;
    assert!(!state.coding_challenge_offered);
    assert!(rig.orchestrator.accept_challenge().await.is_err());
    assert_eq!(
        rig.sink
            .count(|event| matches!(event, AppEvent::ChallengeOffered { .. })),
        0
    );
    assert!(rig.sink.notices().is_empty());

    let route = rig.orchestrator.handle_voice_event(VoiceEvent::CallEnd).await;
    assert_eq!(route, Some(feedback_route()));
}

#[tokio::test]
async fn only_the_interviewer_can_trigger_the_challenge() {
    let rig = interview_rig(true);
    connect(&rig).await;

    rig.orchestrator
        .handle_voice_event(user("Can we skip the coding challenge?"))
        .await;
    assert!(!rig.orchestrator.snapshot().await.coding_challenge_offered);

    rig.orchestrator
        .handle_voice_event(assistant("Time for a CODING CHALLENGE."))
        .await;
    let state = rig.orchestrator.snapshot().await;
    assert!(state.coding_challenge_offered);
    assert_eq!(state.coding_question.unwrap().title, "Two Sum");
}

#[tokio::test]
async fn challenge_is_offered_once_even_after_decline() {
    let rig = interview_rig(true);
    connect(&rig).await;

    rig.orchestrator
        .handle_voice_event(assistant("Here is a coding challenge"))
        .await;
    rig.orchestrator.decline_challenge().await;
    rig.orchestrator
        .handle_voice_event(assistant("Are you sure about the coding challenge?"))
        .await;

    assert!(!rig.orchestrator.snapshot().await.coding_challenge_offered);
    assert_eq!(
        rig.sink
            .count(|event| matches!(event, AppEvent::ChallengeOffered { .. })),
        1
    );
}

#[tokio::test]
async fn submission_with_violations_yields_both_feedback_fields() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator
        .handle_voice_event(assistant("Let's move on to the coding challenge"))
        .await;

    let mut view = rig.orchestrator.accept_challenge().await.unwrap();
    let state = rig.orchestrator.snapshot().await;
    assert!(!state.coding_challenge_offered);
    assert!(state.coding_challenge_accepted);
    assert!(view.monitor().camera_active());

    view.select_language(Language::Python);
    assert_eq!(view.code(), Language::Python.default_code());
    view.set_code("def solution(nums, target):\n    return [0, 1]");
    view.monitor().on_visibility_change(Visibility::Hidden);
    view.monitor().on_visibility_change(Visibility::Visible);
    view.monitor()
        .record_violation(ViolationKind::Eyes, "Eyes not visible or looking away");

    let stream = rig.camera.last_stream().unwrap();
    rig.orchestrator.submit_code(view).await.unwrap();

    assert_eq!(stream.stop_calls.load(Ordering::SeqCst), 1);
    let state = rig.orchestrator.snapshot().await;
    assert!(!state.coding_challenge_accepted);
    assert_eq!(state.status, CallStatus::Active);
    let submitted = state.submitted_code.unwrap();
    assert_eq!(submitted.language, "Python (3.8.1)");
    assert_eq!(submitted.violations.len(), 2);

    let route = rig.orchestrator.disconnect().await.unwrap();

    assert_eq!(route, feedback_route());
    assert_eq!(rig.voice.stops.load(Ordering::SeqCst), 1);
    let saved = rig.store.saved();
    assert_eq!(
        saved[0].1.code_feedback.as_deref(),
        Some("Two Sum solution in Python (3.8.1) is correct")
    );
    assert_eq!(
        saved[0].1.proctoring_feedback.as_deref(),
        Some("2 integrity concerns")
    );
    let state = rig.orchestrator.snapshot().await;
    assert!(state.code_feedback.is_some());
    assert!(state.proctoring_feedback.is_some());
}

#[tokio::test]
async fn reaching_max_violations_forces_submission() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator
        .handle_voice_event(assistant("coding challenge time"))
        .await;
    let mut view = rig.orchestrator.accept_challenge().await.unwrap();

    for _ in 0..3 {
        view.monitor().on_visibility_change(Visibility::Hidden);
        view.monitor().on_visibility_change(Visibility::Visible);
    }
    let signals = view.drain_signals();
    assert_eq!(signals.len(), 4);
    assert!(view.is_terminated());

    rig.orchestrator.submit_code(view).await.unwrap();

    let submitted = rig.orchestrator.snapshot().await.submitted_code.unwrap();
    assert_eq!(submitted.violations.len(), 3);
    assert!(submitted
        .violations
        .iter()
        .all(|violation| violation.kind == ViolationKind::Tab));
    assert_eq!(
        rig.sink
            .count(|event| matches!(event, AppEvent::ProctoringTerminated { .. })),
        1
    );
}

#[tokio::test]
async fn closing_the_view_keeps_nothing() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator
        .handle_voice_event(assistant("coding challenge"))
        .await;
    let mut view = rig.orchestrator.accept_challenge().await.unwrap();
    let stream = rig.camera.last_stream().unwrap();

    view.monitor().on_visibility_change(Visibility::Hidden);
    match view.next_signal().await {
        Some(mockview::MonitorSignal::Violation(violation)) => {
            assert_eq!(violation.kind, ViolationKind::Tab)
        }
        other => panic!("expected a tab violation, got {other:?}"),
    }
    assert!(!view.is_terminated());

    rig.orchestrator.close_coding_view(view).await;

    assert_eq!(stream.stop_calls.load(Ordering::SeqCst), 1);
    let state = rig.orchestrator.snapshot().await;
    assert!(!state.coding_challenge_accepted);
    assert!(state.submitted_code.is_none());
}

#[tokio::test]
async fn submitting_after_the_call_ended_is_refused() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator
        .handle_voice_event(assistant("coding challenge"))
        .await;
    let mut view = rig.orchestrator.accept_challenge().await.unwrap();
    view.set_code("print('late')");
    let stream = rig.camera.last_stream().unwrap();

    rig.orchestrator.disconnect().await.unwrap();
    assert!(rig.orchestrator.submit_code(view).await.is_err());

    assert_eq!(stream.stop_calls.load(Ordering::SeqCst), 1);
    assert!(rig.orchestrator.snapshot().await.submitted_code.is_none());
    assert_eq!(
        rig.sink
            .count(|event| matches!(event, AppEvent::CodeSubmitted { .. })),
        0
    );
    assert_eq!(rig.scoring.code_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn editor_runs_code_and_fetches_hints() {
    let rig = interview_rig(true);
    connect(&rig).await;
    rig.orchestrator
        .handle_voice_event(assistant("coding challenge"))
        .await;
    let mut view = rig.orchestrator.accept_challenge().await.unwrap();

    let executor = FakeExecutor::default();
    assert_eq!(view.run_code(&executor).await, "[0,1]\n");
    let request = executor.requests.lock().unwrap()[0].clone();
    assert_eq!(request.language_id, 63);
    assert_eq!(request.stdin, "[2,7,11,15]\n9");

    let broken = FakeExecutor {
        fail: true,
        ..Default::default()
    };
    assert_eq!(
        view.run_code(&broken).await,
        "Error executing code. Please try again."
    );

    assert_eq!(
        view.request_hint(rig.scoring.as_ref()).await,
        Some("Think about a hash map")
    );
    view.dismiss_hint();
    assert_eq!(view.hint(), None);

    let failing = FakeScoring {
        fail_hint: true,
        ..Default::default()
    };
    assert_eq!(view.request_hint(&failing).await, None);
    assert!(rig
        .sink
        .notices()
        .contains(&"Failed to generate hint. Please try again.".to_string()));
}

#[tokio::test]
async fn persistence_failure_routes_home() {
    let store = MemoryStore {
        fail_writes: true,
        ..MemoryStore::with_interview(interview(None))
    };
    let rig = rig(
        SessionPurpose::Interview,
        store,
        FakeScoring::default(),
        FakeVoice::default(),
    );
    connect(&rig).await;

    let route = rig.orchestrator.handle_voice_event(VoiceEvent::CallEnd).await;
    assert_eq!(route, Some(Route::Home));
}

#[tokio::test]
async fn transcript_scoring_failure_routes_home() {
    let scoring = FakeScoring {
        fail_transcript: true,
        ..Default::default()
    };
    let rig = rig(
        SessionPurpose::Interview,
        MemoryStore::with_interview(interview(None)),
        scoring,
        FakeVoice::default(),
    );
    connect(&rig).await;

    let route = rig.orchestrator.disconnect().await.unwrap();
    assert_eq!(route, Route::Home);
    assert!(rig.store.saved().is_empty());
}

#[tokio::test]
async fn finish_side_effects_run_once() {
    let rig = interview_rig(false);
    connect(&rig).await;

    let first = rig.orchestrator.disconnect().await.unwrap();
    let late_end = rig.orchestrator.handle_voice_event(VoiceEvent::CallEnd).await;

    assert_eq!(first, feedback_route());
    assert_eq!(late_end, None);
    assert!(rig.orchestrator.disconnect().await.is_err());
    assert_eq!(rig.scoring.transcript_calls.load(Ordering::SeqCst), 1);
    assert_eq!(rig.store.saved().len(), 1);
}

#[tokio::test]
async fn failed_start_returns_to_inactive() {
    let voice = FakeVoice {
        fail_start: true,
        ..Default::default()
    };
    let rig = rig(
        SessionPurpose::Interview,
        MemoryStore::with_interview(interview(None)),
        FakeScoring::default(),
        voice,
    );

    assert!(rig.orchestrator.start_call().await.is_err());
    assert_eq!(rig.orchestrator.status(), CallStatus::Inactive);
    assert!(rig
        .sink
        .notices()
        .contains(&"Failed to start the call".to_string()));
}

#[tokio::test]
async fn speaking_indicator_and_transcript_follow_events() {
    let rig = interview_rig(false);
    connect(&rig).await;

    rig.orchestrator.handle_voice_event(VoiceEvent::SpeechStart).await;
    assert!(rig.orchestrator.snapshot().await.is_speaking);
    rig.orchestrator.handle_voice_event(VoiceEvent::SpeechEnd).await;
    assert!(!rig.orchestrator.snapshot().await.is_speaking);

    let partial = VoiceMessage {
        transcript_type: "partial".into(),
        ..VoiceMessage::final_transcript("user", "I th")
    };
    rig.orchestrator
        .handle_voice_event(VoiceEvent::Message(partial))
        .await;
    rig.orchestrator.handle_voice_event(user("I think so")).await;

    let state = rig.orchestrator.snapshot().await;
    assert_eq!(state.transcript.len(), 1);
    assert_eq!(state.last_message(), Some("I think so"));
}

#[tokio::test]
async fn run_pumps_events_until_the_call_ends() {
    let rig = interview_rig(true);
    rig.orchestrator.load_interview().await;
    rig.orchestrator.start_call().await.unwrap();

    let subscription = rig.voice.subscribe();
    let running = {
        let orchestrator = rig.orchestrator.clone();
        tokio::spawn(async move { orchestrator.run(subscription).await })
    };

    rig.voice.bus.publish(VoiceEvent::CallStart);
    rig.voice.bus.publish(assistant("Hello, shall we begin?"));
    rig.voice.bus.publish(user("Yes"));
    rig.voice.bus.publish(VoiceEvent::CallEnd);

    let route = running.await.unwrap();
    assert_eq!(route, feedback_route());
    assert_eq!(rig.orchestrator.snapshot().await.transcript.len(), 2);
    assert_eq!(rig.voice.bus.subscriber_count(), 0);
}

#[tokio::test]
async fn run_returns_when_disconnected_elsewhere() {
    let rig = interview_rig(false);
    connect(&rig).await;

    let subscription = rig.voice.subscribe();
    let running = {
        let orchestrator = rig.orchestrator.clone();
        tokio::spawn(async move { orchestrator.run(subscription).await })
    };

    let route = rig.orchestrator.disconnect().await.unwrap();
    assert_eq!(running.await.unwrap(), route);
    assert_eq!(rig.store.saved().len(), 1);
}
