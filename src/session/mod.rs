pub mod call;
pub mod coding_view;
pub mod config;
pub mod controller;
pub mod feedback;
pub mod state;
pub mod trigger;

pub use call::{build_call_config, format_coding_question, format_questions};
pub use coding_view::{CodingView, Language};
pub use config::SessionSettings;
pub use controller::{Collaborators, SessionOptions, SessionOrchestrator};
pub use feedback::{FeedbackPipeline, PipelineInput, PipelineOutcome};
pub use state::{CallStatus, SessionPurpose, SessionState};
pub use trigger::contains_trigger;
