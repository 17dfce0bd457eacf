//! Per-tick interpretation of detector output.
//!
//! All checks are edge-triggered: a condition that persists across ticks is
//! reported once, when it starts, and recovering from it is silent.

use tokio::time::Instant;

use crate::{
    models::ViolationKind,
    services::DetectedFace,
};

use super::{ProctoringConfig, ProctoringState};

pub const FACE_MISSING_DETAILS: &str = "Face not detected for extended period";
pub const EYES_HIDDEN_DETAILS: &str = "Eyes not visible or looking away";
pub const PHONE_DETAILS: &str = "Possible secondary device usage detected";

/// A violation the tick wants recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: ViolationKind,
    pub details: String,
}

impl Finding {
    fn new(kind: ViolationKind, details: &str) -> Self {
        Self {
            kind,
            details: details.to_string(),
        }
    }
}

/// Updates the face/eyes/phone flags from one frame's detections and returns
/// the violations that became due at `now`. Only the first face is inspected.
pub fn evaluate_frame(
    state: &mut ProctoringState,
    faces: &[DetectedFace],
    now: Instant,
    config: &ProctoringConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let Some(face) = faces.first() else {
        state.face_visible = false;

        if let Some(last_seen) = state.last_face_seen_at {
            if now.saturating_duration_since(last_seen) > config.face_missing_threshold() {
                findings.push(Finding::new(ViolationKind::Face, FACE_MISSING_DETAILS));
                state.last_face_seen_at = None;
            }
        }
        return findings;
    };

    state.last_face_seen_at = Some(now);
    state.face_visible = true;

    let eyes_detected = face.landmarks.eyes_detected();
    state.eyes_visible = eyes_detected;
    if !eyes_detected {
        if !state.looking_away {
            state.looking_away = true;
            findings.push(Finding::new(ViolationKind::Eyes, EYES_HIDDEN_DETAILS));
        }
    } else {
        state.looking_away = false;
    }

    let expressions = &face.expressions;
    let looking_down =
        expressions.sad > config.sad_threshold || expressions.angry > config.angry_threshold;
    if looking_down && !state.phone_flagged {
        state.phone_flagged = true;
        findings.push(Finding::new(ViolationKind::Phone, PHONE_DETAILS));
    } else if !looking_down {
        state.phone_flagged = false;
    }

    findings
}
