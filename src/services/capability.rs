use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing_mode: FacingMode::User,
        }
    }
}

/// Latest decoded frame of the webcam stream.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

/// A live camera stream. Owned exclusively by the proctoring monitor.
pub trait VideoStream: Send + Sync {
    /// False once the stream is paused, ended or its tracks were stopped.
    fn is_live(&self) -> bool;

    fn current_frame(&self) -> Option<VideoFrame>;

    /// Stops every media track of the stream.
    fn stop_tracks(&self);
}

#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Requests the webcam. Errors cover both permission denial and missing hardware.
    async fn open(&self, constraints: VideoConstraints) -> Result<Arc<dyn VideoStream>>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
}

impl FaceLandmarks {
    pub fn eyes_detected(&self) -> bool {
        !self.left_eye.is_empty() && !self.right_eye.is_empty()
    }
}

/// Expression intensities in [0, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Expressions {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectedFace {
    pub landmarks: FaceLandmarks,
    pub expressions: Expressions,
}

/// Face, landmark and expression detection over a single frame.
#[async_trait]
pub trait FrameDetector: Send + Sync {
    /// Loads whatever models detection needs. Called once per activation.
    async fn load_models(&self) -> Result<()>;

    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<DetectedFace>>;
}
