use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use anyhow::{Context, Result};
use tokio::{
    sync::{mpsc, Mutex as AsyncMutex},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{AppEvent, EventSink, Notice, NoticeLevel},
    models::{Violation, ViolationKind},
    services::{CameraSource, FrameDetector, VideoStream},
};

use super::{detection::evaluate_frame, loop_worker::detection_loop, ProctoringConfig, ProctoringState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const CAMERA_DENIED_DETAILS: &str = "Camera access denied or not available";

/// What the monitor tells its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorSignal {
    Violation(Violation),
    /// Sent once, when the log first reaches the configured maximum.
    MaxViolations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

struct Shared {
    state: ProctoringState,
    stream: Option<Arc<dyn VideoStream>>,
}

struct DetectionTask {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

pub(crate) struct MonitorInner {
    config: ProctoringConfig,
    camera: Arc<dyn CameraSource>,
    detector: Arc<dyn FrameDetector>,
    events: Arc<dyn EventSink>,
    signals: mpsc::UnboundedSender<MonitorSignal>,
    shared: Mutex<Shared>,
    active: AtomicBool,
    /// Bumped on every activation and deactivation; work started under an
    /// older epoch must not commit.
    epoch: AtomicU64,
    detection: Mutex<Option<DetectionTask>>,
    /// Held for a whole tick, from frame capture through commit.
    tick_guard: AsyncMutex<()>,
}

/// Webcam and tab-focus proctoring for one coding challenge.
///
/// Dropping the monitor deactivates it, which halts detection and releases
/// the camera.
pub struct ProctoringMonitor {
    inner: Arc<MonitorInner>,
}

impl ProctoringMonitor {
    pub fn new(
        config: ProctoringConfig,
        camera: Arc<dyn CameraSource>,
        detector: Arc<dyn FrameDetector>,
        events: Arc<dyn EventSink>,
    ) -> (Self, mpsc::UnboundedReceiver<MonitorSignal>) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let inner = MonitorInner {
            config,
            camera,
            detector,
            events,
            signals,
            shared: Mutex::new(Shared {
                state: ProctoringState::new(),
                stream: None,
            }),
            active: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            detection: Mutex::new(None),
            tick_guard: AsyncMutex::new(()),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            receiver,
        )
    }

    /// Loads detection models, acquires the camera and starts the detection loop.
    ///
    /// Neither a model failure nor a camera failure is fatal: the monitor keeps
    /// watching tab focus (and camera presence) in a degraded mode.
    pub async fn activate(&self) {
        let inner = &self.inner;
        if inner.active.swap(true, Ordering::SeqCst) {
            return;
        }
        let epoch = inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        inner.lock_shared().state = ProctoringState::new();
        log_info!("proctoring activated (epoch {epoch})");

        let models_loaded = match inner.detector.load_models().await {
            Ok(()) => true,
            Err(err) => {
                log_error!("failed to load face detection models: {err:?}");
                inner.events.emit(AppEvent::notice(
                    NoticeLevel::Error,
                    "Failed to load face detection models",
                ));
                false
            }
        };
        if !inner.is_current(epoch) {
            return;
        }
        inner.lock_shared().state.models_loaded = models_loaded;

        let camera_active = match inner.camera.open(inner.config.video).await {
            Ok(stream) => {
                if !inner.is_current(epoch) {
                    stream.stop_tracks();
                    return;
                }
                {
                    let mut shared = inner.lock_shared();
                    shared.stream = Some(stream);
                    shared.state.camera_active = true;
                }
                inner.events.emit(AppEvent::notice(
                    NoticeLevel::Success,
                    "Camera activated for proctoring",
                ));
                true
            }
            Err(err) => {
                if !inner.is_current(epoch) {
                    return;
                }
                log_warn!("camera unavailable for proctoring: {err:?}");
                inner.lock_shared().state.camera_denied = true;
                inner.record_violation(ViolationKind::Camera, CAMERA_DENIED_DETAILS.to_string());
                inner.events.emit(AppEvent::notice(
                    NoticeLevel::Error,
                    "Camera access required for proctoring",
                ));
                false
            }
        };

        if models_loaded && camera_active && !inner.is_terminated() {
            inner.start_detection(epoch);
        }
    }

    /// Halts the detection loop and releases the camera. Results of a tick
    /// still in flight are discarded.
    pub fn deactivate(&self) {
        self.inner.shutdown();
    }

    pub fn record_violation(&self, kind: ViolationKind, details: impl Into<String>) -> Violation {
        self.inner.record_violation(kind, details.into())
    }

    /// Feeds a document visibility change. Only visible→hidden transitions count.
    pub fn on_visibility_change(&self, visibility: Visibility) {
        self.inner.on_visibility_change(visibility);
    }

    /// Releases every media track. Safe to call repeatedly or before the
    /// camera was ever started.
    pub fn stop_camera(&self) {
        self.inner.stop_camera();
    }

    /// Runs a single detection tick outside the timer. Waits for any tick
    /// already in flight.
    pub async fn run_detection_tick(&self) -> Result<()> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        self.inner.detection_tick(epoch).await
    }

    pub fn snapshot(&self) -> ProctoringState {
        self.inner.lock_shared().state.clone()
    }

    /// Copy of the violation log; the live log is never handed out.
    pub fn violations(&self) -> Vec<Violation> {
        self.inner.lock_shared().state.violations.clone()
    }

    pub fn violation_count(&self) -> usize {
        self.inner.lock_shared().state.violation_count()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    pub fn camera_active(&self) -> bool {
        self.inner.lock_shared().state.camera_active
    }

    pub fn max_violations(&self) -> usize {
        self.inner.config.max_violations
    }
}

impl Drop for ProctoringMonitor {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl MonitorInner {
    fn lock_shared(&self) -> MutexGuard<'_, Shared> {
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_detection(&self) -> MutexGuard<'_, Option<DetectionTask>> {
        match self.detection.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.active.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn is_terminated(&self) -> bool {
        self.lock_shared().state.terminated
    }

    fn start_detection(self: &Arc<Self>, epoch: u64) {
        let mut slot = self.lock_detection();
        if let Some(previous) = slot.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(detection_loop(
            Arc::downgrade(self),
            epoch,
            self.config.check_interval(),
            self.config.detection_timeout(),
            cancel_token.clone(),
        ));
        *slot = Some(DetectionTask {
            handle,
            cancel_token,
        });
        log_info!(
            "face detection loop started ({}ms interval)",
            self.config.check_interval_ms
        );
    }

    fn halt_detection(&self) {
        if let Some(task) = self.lock_detection().take() {
            task.cancel_token.cancel();
            task.handle.abort();
        }
    }

    fn shutdown(&self) {
        let was_active = self.active.swap(false, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.halt_detection();
        self.stop_camera();
        if was_active {
            log_info!("proctoring deactivated");
        }
    }

    fn stop_camera(&self) {
        let stream = {
            let mut shared = self.lock_shared();
            shared.state.camera_active = false;
            shared.stream.take()
        };
        if let Some(stream) = stream {
            stream.stop_tracks();
            log_info!("camera released");
        }
    }

    fn record_violation(&self, kind: ViolationKind, details: String) -> Violation {
        let violation = Violation::new(kind, details);
        let (count, reached_max) = {
            let mut shared = self.lock_shared();
            let reached_max = shared
                .state
                .push_violation(violation.clone(), self.config.max_violations);
            (shared.state.violation_count(), reached_max)
        };
        self.publish(violation.clone(), count, reached_max);
        violation
    }

    fn on_visibility_change(&self, visibility: Visibility) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        let max = self.config.max_violations;
        let recorded = {
            let mut shared = self.lock_shared();
            match visibility {
                Visibility::Visible => {
                    shared.state.tab_focused = true;
                    None
                }
                Visibility::Hidden if !shared.state.tab_focused => None,
                Visibility::Hidden => {
                    shared.state.tab_focused = false;
                    shared.state.tab_switch_count += 1;
                    let switches = shared.state.tab_switch_count;
                    let violation = Violation::new(
                        ViolationKind::Tab,
                        format!("Tab switch detected ({switches}/{max})"),
                    );
                    let reached_max = shared.state.push_violation(violation.clone(), max);
                    Some((violation, shared.state.violation_count(), reached_max, switches))
                }
            }
        };

        if let Some((violation, count, reached_max, switches)) = recorded {
            self.events.emit(AppEvent::Notice(
                Notice::new(
                    NoticeLevel::Warning,
                    format!("Tab switch detected! ({switches}/{max})"),
                )
                .with_description("Switching tabs during the coding challenge is not allowed."),
            ));
            self.publish(violation, count, reached_max);
        }
    }

    pub(crate) async fn detection_tick(&self, epoch: u64) -> Result<()> {
        let _tick = self.tick_guard.lock().await;
        let frame = {
            let shared = self.lock_shared();
            if !self.is_current(epoch) {
                return Ok(());
            }
            let state = &shared.state;
            if !state.models_loaded || !state.camera_active || !state.tab_focused {
                return Ok(());
            }
            match shared.stream.as_ref() {
                Some(stream) if stream.is_live() => stream.current_frame(),
                _ => None,
            }
        };
        let Some(frame) = frame else {
            return Ok(());
        };

        let faces = self
            .detector
            .detect(&frame)
            .await
            .context("face detection failed")?;
        let now = Instant::now();

        let max = self.config.max_violations;
        let mut reached_max_at = None;
        let recorded: Vec<(Violation, usize)> = {
            let mut shared = self.lock_shared();
            if !self.is_current(epoch) {
                log_info!("discarding detection result from a deactivated monitor");
                return Ok(());
            }
            let findings = evaluate_frame(&mut shared.state, &faces, now, &self.config);
            findings
                .into_iter()
                .map(|finding| {
                    let violation = Violation::new(finding.kind, finding.details);
                    let reached_max = shared.state.push_violation(violation.clone(), max);
                    let count = shared.state.violation_count();
                    if reached_max {
                        reached_max_at = Some(count);
                    }
                    (violation, count)
                })
                .collect()
        };

        // Every finding of the frame is announced before termination.
        for (violation, count) in recorded {
            self.publish(violation, count, false);
        }
        if let Some(count) = reached_max_at {
            self.terminate(count);
        }
        Ok(())
    }

    fn publish(&self, violation: Violation, count: usize, reached_max: bool) {
        let max = self.config.max_violations;
        log_warn!(
            "proctoring violation {} ({}/{}): {}",
            violation.kind,
            count,
            max,
            violation.details
        );
        let _ = self.signals.send(MonitorSignal::Violation(violation.clone()));
        self.events.emit(AppEvent::ViolationRecorded {
            violation,
            count,
            max,
        });

        if reached_max {
            self.terminate(count);
        }
    }

    fn terminate(&self, count: usize) {
        log_warn!("maximum proctoring violations reached ({count}), challenge terminated");
        self.halt_detection();
        self.stop_camera();
        let _ = self.signals.send(MonitorSignal::MaxViolations);
        self.events.emit(AppEvent::ProctoringTerminated {
            message: "Maximum violations reached. Challenge terminated.".to_string(),
            description: "Your attempt has been flagged for suspicious activity.".to_string(),
            violation_count: count,
        });
    }
}
