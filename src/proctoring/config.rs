use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::services::VideoConstraints;

/// Thresholds and timings for the proctoring monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProctoringConfig {
    /// Violations that end the challenge.
    pub max_violations: usize,

    /// Period of the face detection loop.
    pub check_interval_ms: u64,

    /// A face absent for longer than this (since the last sighting) is a violation.
    pub face_missing_threshold_ms: u64,

    /// Expression intensities used as a proxy for looking down at a second device.
    pub sad_threshold: f32,
    pub angry_threshold: f32,

    /// Upper bound on one detector call; a slower tick is dropped.
    pub detection_timeout_ms: u64,

    pub video: VideoConstraints,
}

impl Default for ProctoringConfig {
    fn default() -> Self {
        Self {
            max_violations: 3,
            check_interval_ms: 2_000,
            face_missing_threshold_ms: 5_000,
            sad_threshold: 0.5,
            angry_threshold: 0.3,
            detection_timeout_ms: 1_500,
            video: VideoConstraints::default(),
        }
    }
}

/// Floor for the loop period and tick timeout; a zero period cannot drive a timer.
const MIN_PERIOD_MS: u64 = 1;

impl ProctoringConfig {
    /// Rejects values the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_violations == 0 {
            bail!("maxViolations must be at least 1");
        }
        if self.check_interval_ms == 0 {
            bail!("checkIntervalMs must be greater than zero");
        }
        if self.detection_timeout_ms == 0 {
            bail!("detectionTimeoutMs must be greater than zero");
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms.max(MIN_PERIOD_MS))
    }

    pub fn face_missing_threshold(&self) -> Duration {
        Duration::from_millis(self.face_missing_threshold_ms)
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.detection_timeout_ms.max(MIN_PERIOD_MS))
    }
}
