//! The editor opened when a coding challenge is accepted. Hosts the
//! proctoring monitor for as long as it is open.

use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    events::{AppEvent, EventSink, NoticeLevel},
    models::{CodingQuestion, SubmittedCode},
    proctoring::{MonitorSignal, ProctoringMonitor},
    services::{CodeExecutor, ExecutionRequest, ScoringService},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Java,
    Cpp,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
    ];

    /// Judge language id of the execution service.
    pub fn judge_id(&self) -> u32 {
        match self {
            Language::JavaScript => 63,
            Language::Python => 71,
            Language::Java => 62,
            Language::Cpp => 54,
            Language::CSharp => 51,
        }
    }

    pub fn from_judge_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|language| language.judge_id() == id)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript (Node.js 12.14.0)",
            Language::Python => "Python (3.8.1)",
            Language::Java => "Java (OpenJDK 13.0.1)",
            Language::Cpp => "C++ (GCC 9.2.0)",
            Language::CSharp => "C# (Mono 6.6.0.161)",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::JavaScript => "js",
            Language::Python => "py",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::CSharp => "cs",
        }
    }

    pub fn default_code(&self) -> &'static str {
        match self {
            Language::JavaScript => {
                "function solution(input) {\n  // Write your code here\n  \n  return result;\n}"
            }
            Language::Python => "def solution(input):\n    # Write your code here\n    \n    return result",
            Language::Java => {
                "public class Solution {\n    public static Object solution(Object input) {\n        // Write your code here\n        \n        return result;\n    }\n}"
            }
            Language::Cpp => {
                "#include <iostream>\n\nusing namespace std;\n\nint solution(int input) {\n    // Write your code here\n    \n    return result;\n}"
            }
            Language::CSharp => {
                "using System;\n\npublic class Solution {\n    public static object Main(object input) {\n        // Write your code here\n        \n        return result;\n    }\n}"
            }
        }
    }
}

pub const RUN_FAILED_OUTPUT: &str = "Error executing code. Please try again.";

pub struct CodingView {
    question: CodingQuestion,
    monitor: ProctoringMonitor,
    signals: mpsc::UnboundedReceiver<MonitorSignal>,
    events: Arc<dyn EventSink>,
    language: Language,
    code: String,
    output: Option<String>,
    hint: Option<String>,
    terminated: bool,
}

impl CodingView {
    /// Opens the editor and activates proctoring for it.
    pub async fn open(
        question: CodingQuestion,
        monitor: ProctoringMonitor,
        signals: mpsc::UnboundedReceiver<MonitorSignal>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        monitor.activate().await;
        let language = Language::default();
        info!("coding view opened for '{}'", question.title);
        let terminated = monitor.is_terminated();
        Self {
            question,
            monitor,
            signals,
            events,
            language,
            code: language.default_code().to_string(),
            output: None,
            hint: None,
            terminated,
        }
    }

    pub fn question(&self) -> &CodingQuestion {
        &self.question
    }

    pub fn monitor(&self) -> &ProctoringMonitor {
        &self.monitor
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Switches language and resets the buffer to that language's template.
    pub fn select_language(&mut self, language: Language) {
        self.language = language;
        self.code = language.default_code().to_string();
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn dismiss_hint(&mut self) {
        self.hint = None;
    }

    /// Runs the buffer against the first example's input and keeps what to show.
    pub async fn run_code(&mut self, executor: &dyn CodeExecutor) -> &str {
        self.output = None;
        let request = ExecutionRequest {
            language_id: self.language.judge_id(),
            source_code: self.code.clone(),
            stdin: self
                .question
                .first_example_input()
                .unwrap_or_default()
                .to_string(),
        };

        let shown = match executor.run(request).await {
            Ok(result) => result.display_output().to_string(),
            Err(err) => {
                error!("Error executing code: {err:?}");
                RUN_FAILED_OUTPUT.to_string()
            }
        };
        self.output.insert(shown).as_str()
    }

    pub async fn request_hint(&mut self, scoring: &dyn ScoringService) -> Option<&str> {
        match scoring.hint(&self.question).await {
            Ok(hint) => {
                self.hint = Some(hint);
                self.hint.as_deref()
            }
            Err(err) => {
                error!("Error generating hint: {err:?}");
                self.events.emit(AppEvent::notice(
                    NoticeLevel::Error,
                    "Failed to generate hint. Please try again.",
                ));
                None
            }
        }
    }

    /// Waits for the next monitor signal.
    pub async fn next_signal(&mut self) -> Option<MonitorSignal> {
        let signal = self.signals.recv().await;
        self.observe(signal.as_ref());
        signal
    }

    /// Signals already queued, without waiting.
    pub fn drain_signals(&mut self) -> Vec<MonitorSignal> {
        let mut drained = Vec::new();
        while let Ok(signal) = self.signals.try_recv() {
            self.observe(Some(&signal));
            drained.push(signal);
        }
        drained
    }

    /// True once proctoring ended the challenge; the host should submit.
    pub fn is_terminated(&self) -> bool {
        self.terminated || self.monitor.is_terminated()
    }

    fn observe(&mut self, signal: Option<&MonitorSignal>) {
        if let Some(MonitorSignal::MaxViolations) = signal {
            self.terminated = true;
        }
    }

    /// Stops proctoring and hands over the code with a copy of the violations.
    pub(crate) fn into_submission(self) -> SubmittedCode {
        self.monitor.deactivate();
        SubmittedCode {
            code: self.code.clone(),
            language: self.language.display_name().to_string(),
            violations: self.monitor.violations(),
        }
    }

    pub(crate) fn close(self) {
        self.monitor.deactivate();
        info!("coding view closed without submission");
    }
}
