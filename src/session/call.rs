//! Variables handed to the voice interface when a call starts.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::{
    models::CodingQuestion,
    services::{CallConfig, CallTarget},
};

use super::{config::SessionSettings, controller::SessionOptions, SessionPurpose};

pub fn format_questions(questions: &[String]) -> String {
    questions
        .iter()
        .map(|question| format!("- {question}"))
        .collect::<Vec<_>>()
        .join("\n")
}

static MARKUP_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Removes markup tags, leaving the text between them.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG_PATTERN.replace_all(text, "").into_owned()
}

/// Plain-text summary of the coding question for the interviewer to read from.
pub fn format_coding_question(question: &CodingQuestion) -> String {
    let example = question.examples.first();
    let example_input = example.map(|e| e.input.as_str()).unwrap_or("N/A");
    let example_output = example.map(|e| e.output.as_str()).unwrap_or("N/A");
    let constraints = question
        .constraints
        .iter()
        .map(|constraint| format!("- {constraint}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Coding Challenge: \"{}\"\nDifficulty: {}\nCategory: {}\nDescription: {}\n\nExample Input: {}\nExample Output: {}\n\nConstraints:\n{}",
        question.title,
        question.difficulty,
        question.category,
        strip_markup(&question.description),
        example_input,
        example_output,
        constraints,
    )
}

pub fn build_call_config(
    options: &SessionOptions,
    coding_question: Option<&CodingQuestion>,
    settings: &SessionSettings,
) -> CallConfig {
    let mut variable_values = BTreeMap::new();

    match options.purpose {
        SessionPurpose::Generate => {
            variable_values.insert("username".to_string(), options.user_name.clone());
            variable_values.insert("userid".to_string(), options.user_id.clone());
            CallConfig {
                target: CallTarget::Workflow(settings.generate_workflow_id.clone()),
                variable_values,
            }
        }
        SessionPurpose::Interview => {
            variable_values.insert("questions".to_string(), format_questions(&options.questions));
            variable_values.insert(
                "codingQuestion".to_string(),
                coding_question.map(format_coding_question).unwrap_or_default(),
            );
            CallConfig {
                target: CallTarget::Assistant(settings.interviewer_assistant_id.clone()),
                variable_values,
            }
        }
    }
}
