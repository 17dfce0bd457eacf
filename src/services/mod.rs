//! Narrow interfaces to everything the two state machines depend on but do
//! not own: the voice call, the camera and face detector, the scoring model,
//! the document store and the remote code runner.

pub mod capability;
pub mod execution;
pub mod scoring;
pub mod store;
pub mod voice;

pub use capability::{
    CameraSource, DetectedFace, Expressions, FaceLandmarks, FrameDetector, Point, VideoConstraints,
    VideoFrame, VideoStream,
};
pub use execution::{CodeExecutor, ExecutionRequest, ExecutionResult, ExecutionStatus};
pub use scoring::ScoringService;
pub use store::DocumentStore;
pub use voice::{
    CallConfig, CallTarget, VoiceEvent, VoiceEventBus, VoiceInterface, VoiceMessage,
    VoiceSubscription,
};
