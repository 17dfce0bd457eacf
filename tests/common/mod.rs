#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use mockview::{
    models::{
        CategoryScore, CodingExample, CodingQuestion, FeedbackRecord, Interview,
        TranscriptAssessment, TranscriptLine, Violation,
    },
    services::{
        CallConfig, CameraSource, CodeExecutor, DetectedFace, DocumentStore, ExecutionRequest,
        ExecutionResult, Expressions, FaceLandmarks, FrameDetector, Point, ScoringService,
        VideoConstraints, VideoFrame, VideoStream, VoiceEventBus, VoiceInterface,
        VoiceSubscription,
    },
    AppEvent, EventSink,
};

pub struct FakeStream {
    live: AtomicBool,
    pub stop_calls: AtomicUsize,
}

impl VideoStream for FakeStream {
    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        Some(VideoFrame {
            width: 640,
            height: 480,
            pixels: Arc::new(vec![0; 4]),
        })
    }

    fn stop_tracks(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeCamera {
    pub deny: bool,
    pub streams: Mutex<Vec<Arc<FakeStream>>>,
}

impl FakeCamera {
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Default::default()
        }
    }

    pub fn last_stream(&self) -> Option<Arc<FakeStream>> {
        self.streams.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CameraSource for FakeCamera {
    async fn open(&self, _: VideoConstraints) -> Result<Arc<dyn VideoStream>> {
        if self.deny {
            bail!("NotAllowedError: permission denied");
        }
        let stream = Arc::new(FakeStream {
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
        });
        self.streams.lock().unwrap().push(Arc::clone(&stream));
        Ok(stream)
    }
}

/// Returns queued detections in order, then repeats the fallback.
pub struct ScriptedDetector {
    pub fail_load: bool,
    script: Mutex<VecDeque<Vec<DetectedFace>>>,
    fallback: Mutex<Vec<DetectedFace>>,
    pub calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(fallback: Vec<DetectedFace>) -> Self {
        Self {
            fail_load: false,
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new(vec![attentive_face()])
        }
    }

    pub fn push(&self, faces: Vec<DetectedFace>) {
        self.script.lock().unwrap().push_back(faces);
    }

    pub fn set_fallback(&self, faces: Vec<DetectedFace>) {
        *self.fallback.lock().unwrap() = faces;
    }
}

#[async_trait]
impl FrameDetector for ScriptedDetector {
    async fn load_models(&self) -> Result<()> {
        if self.fail_load {
            bail!("model files missing");
        }
        Ok(())
    }

    async fn detect(&self, _: &VideoFrame) -> Result<Vec<DetectedFace>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return Ok(next);
        }
        Ok(self.fallback.lock().unwrap().clone())
    }
}

pub fn attentive_face() -> DetectedFace {
    let eye = vec![Point { x: 1.0, y: 1.0 }; 6];
    DetectedFace {
        landmarks: FaceLandmarks {
            left_eye: eye.clone(),
            right_eye: eye,
        },
        expressions: Expressions {
            neutral: 0.9,
            ..Default::default()
        },
    }
}

pub fn face_without_eyes() -> DetectedFace {
    DetectedFace {
        landmarks: FaceLandmarks::default(),
        expressions: Expressions::default(),
    }
}

#[derive(Default)]
pub struct FakeScoring {
    pub fail_code: bool,
    pub fail_transcript: bool,
    pub fail_hint: bool,
    pub code_calls: AtomicUsize,
    pub proctoring_calls: AtomicUsize,
    pub transcript_calls: AtomicUsize,
}

#[async_trait]
impl ScoringService for FakeScoring {
    async fn score_code(&self, _: &str, language: &str, question: &CodingQuestion) -> Result<String> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_code {
            bail!("scoring model unavailable");
        }
        Ok(format!("{} solution in {language} is correct", question.title))
    }

    async fn score_proctoring(&self, violations: &[Violation]) -> Result<String> {
        self.proctoring_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} integrity concerns", violations.len()))
    }

    async fn score_transcript(
        &self,
        _: &[TranscriptLine],
        _: Option<&str>,
    ) -> Result<TranscriptAssessment> {
        self.transcript_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transcript {
            bail!("scoring model unavailable");
        }
        Ok(TranscriptAssessment {
            total_score: 78,
            category_scores: vec![CategoryScore {
                name: "Problem-Solving".into(),
                score: 80,
                comment: "methodical".into(),
            }],
            strengths: vec!["structured answers".into()],
            areas_for_improvement: vec!["complexity analysis".into()],
            final_assessment: "Promising candidate".into(),
        })
    }

    async fn hint(&self, _: &CodingQuestion) -> Result<String> {
        if self.fail_hint {
            bail!("hint model unavailable");
        }
        Ok("Think about a hash map".into())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub fail_writes: bool,
    pub interviews: Mutex<HashMap<String, Interview>>,
    pub feedback: Mutex<Vec<(String, FeedbackRecord)>>,
}

impl MemoryStore {
    pub fn with_interview(interview: Interview) -> Self {
        let store = Self::default();
        store
            .interviews
            .lock()
            .unwrap()
            .insert(interview.id.clone(), interview);
        store
    }

    pub fn saved(&self) -> Vec<(String, FeedbackRecord)> {
        self.feedback.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_interview(&self, id: &str) -> Result<Option<Interview>> {
        Ok(self.interviews.lock().unwrap().get(id).cloned())
    }

    async fn put_feedback(&self, id: Option<&str>, record: &FeedbackRecord) -> Result<String> {
        if self.fail_writes {
            return Err(anyhow!("permission denied"));
        }
        let id = id.map(str::to_string).unwrap_or_else(|| "fb-1".to_string());
        self.feedback.lock().unwrap().push((id.clone(), record.clone()));
        Ok(id)
    }
}

#[derive(Default)]
pub struct FakeVoice {
    pub bus: VoiceEventBus,
    pub fail_start: bool,
    pub started: Mutex<Vec<CallConfig>>,
    pub stops: AtomicUsize,
}

#[async_trait]
impl VoiceInterface for FakeVoice {
    async fn start(&self, config: CallConfig) -> Result<()> {
        if self.fail_start {
            bail!("microphone unavailable");
        }
        self.started.lock().unwrap().push(config);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> VoiceSubscription {
        self.bus.subscribe()
    }
}

#[derive(Default)]
pub struct FakeExecutor {
    pub fail: bool,
    pub requests: Mutex<Vec<ExecutionRequest>>,
}

#[async_trait]
impl CodeExecutor for FakeExecutor {
    async fn run(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            bail!("sandbox unreachable");
        }
        Ok(ExecutionResult {
            stdout: "[0,1]\n".into(),
            ..Default::default()
        })
    }
}

/// Keeps every emitted event for inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::Notice(notice) => Some(notice.message),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&AppEvent) -> bool) -> usize {
        self.events().iter().filter(|event| matches(event)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: AppEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn coding_question() -> CodingQuestion {
    CodingQuestion {
        id: "q1".into(),
        title: "Two Sum".into(),
        description: "<p>Return the indices of two numbers adding up to target.</p>".into(),
        difficulty: "Easy".into(),
        category: "Arrays".into(),
        examples: vec![CodingExample {
            input: "[2,7,11,15]\n9".into(),
            output: "[0,1]".into(),
            explanation: None,
        }],
        constraints: vec!["2 <= nums.length".into()],
        starter_code: String::new(),
        test_cases: vec![],
        time_limit: 1_800_000,
        memory_limit: 128_000,
    }
}

pub fn interview(coding_question: Option<CodingQuestion>) -> Interview {
    Interview {
        id: "i1".into(),
        user_id: "u1".into(),
        role: "Backend Engineer".into(),
        kind: "Mixed".into(),
        level: "Mid".into(),
        techstack: vec!["rust".into()],
        questions: vec!["Tell me about yourself".into()],
        coding_question,
        finalized: true,
        cover_image: String::new(),
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}
