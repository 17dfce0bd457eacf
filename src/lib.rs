//! Session engine for proctored mock interviews: a voice call with an
//! optional coding challenge, webcam and tab-focus proctoring while the
//! challenge is open, and scored feedback once the call ends.

mod utils;

pub mod db;
pub mod events;
pub mod models;
pub mod proctoring;
pub mod services;
pub mod session;
pub mod settings;

pub use db::Database;
pub use events::{AppEvent, ChannelSink, EventSink, LogSink, Notice, NoticeLevel, Route};
pub use proctoring::{MonitorSignal, ProctoringConfig, ProctoringMonitor, Visibility};
pub use session::{
    CallStatus, CodingView, Collaborators, Language, SessionOptions, SessionOrchestrator,
    SessionPurpose, SessionSettings,
};
pub use settings::{AppSettings, SettingsStore};

/// Installs the `env_logger` backend. Honors `RUST_LOG`, defaults to info,
/// and does nothing if a logger is already set.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
