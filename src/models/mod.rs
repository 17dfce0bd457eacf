pub mod feedback;
pub mod interview;
pub mod submission;
pub mod transcript;
pub mod violation;

pub use feedback::{CategoryScore, Feedback, FeedbackRecord, TranscriptAssessment};
pub use interview::{CodingExample, CodingQuestion, Interview, TestCase};
pub use submission::SubmittedCode;
pub use transcript::{Role, TranscriptLine};
pub use violation::{Violation, ViolationKind};
