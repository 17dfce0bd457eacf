pub mod config;
pub mod detection;
mod loop_worker;
pub mod monitor;
pub mod state;

pub use config::ProctoringConfig;
pub use detection::{evaluate_frame, Finding};
pub use monitor::{MonitorSignal, ProctoringMonitor, Visibility};
pub use state::ProctoringState;
