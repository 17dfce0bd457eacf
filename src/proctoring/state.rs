use serde::Serialize;
use tokio::time::Instant;

use crate::models::Violation;

/// Live proctoring flags and the violation log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringState {
    pub camera_active: bool,
    pub camera_denied: bool,
    pub models_loaded: bool,
    pub tab_focused: bool,
    pub face_visible: bool,
    pub eyes_visible: bool,
    pub looking_away: bool,
    pub phone_flagged: bool,
    /// Cleared after a face violation fires so it is not reported every tick.
    #[serde(skip)]
    pub last_face_seen_at: Option<Instant>,
    pub tab_switch_count: u32,
    /// Append-only while proctoring is active.
    pub violations: Vec<Violation>,
    /// Set once the violation log first reaches the maximum.
    pub terminated: bool,
}

impl Default for ProctoringState {
    fn default() -> Self {
        Self {
            camera_active: false,
            camera_denied: false,
            models_loaded: false,
            tab_focused: true,
            face_visible: false,
            eyes_visible: false,
            looking_away: false,
            phone_flagged: false,
            last_face_seen_at: None,
            tab_switch_count: 0,
            violations: Vec::new(),
            terminated: false,
        }
    }
}

impl ProctoringState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Appends a violation and reports whether this append is the one that
    /// reached `max_violations`. Later appends never report it again.
    pub fn push_violation(&mut self, violation: Violation, max_violations: usize) -> bool {
        self.violations.push(violation);
        if !self.terminated && self.violations.len() >= max_violations {
            self.terminated = true;
            return true;
        }
        false
    }
}
