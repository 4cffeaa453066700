//! Strict parsing of generated quiz content
//!
//! The reply is decoded as data with `serde_json` and every question is
//! validated before the caller persists anything.

use super::QuestionType;
use crate::error::{Error, Result};
use serde::Deserialize;

/// One question exactly as the generator must return it
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratedQuestion {
    pub question_id: serde_json::Value,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Remove one enclosing markdown code fence, if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedGenerationOutput(msg.into())
}

fn validate(index: usize, q: &GeneratedQuestion, question_type: QuestionType) -> Result<()> {
    let n = index + 1;
    if q.question.trim().is_empty() {
        return Err(malformed(format!("question {} has empty text", n)));
    }

    match question_type {
        QuestionType::Mcq => {
            if q.options.len() != 4 {
                return Err(malformed(format!(
                    "question {} has {} options, expected 4",
                    n,
                    q.options.len()
                )));
            }
            if q.options.iter().any(|o| o.trim().is_empty()) {
                return Err(malformed(format!("question {} has an empty option", n)));
            }
        }
        QuestionType::TrueFalse => {
            if q.options != ["True", "False"] {
                return Err(malformed(format!(
                    "question {} options must be exactly [\"True\", \"False\"], got {:?}",
                    n, q.options
                )));
            }
        }
    }

    if !q.options.contains(&q.correct_answer) {
        return Err(malformed(format!(
            "question {} correct_answer {:?} is not one of its options",
            n, q.correct_answer
        )));
    }
    Ok(())
}

/// Decode and validate a generation reply
pub fn parse_generated_questions(
    raw: &str,
    expected: usize,
    question_type: QuestionType,
) -> Result<Vec<GeneratedQuestion>> {
    let body = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| malformed(format!("reply is not valid JSON: {}", e)))?;
    if !value.is_array() {
        return Err(malformed("reply is not a JSON array"));
    }

    let questions: Vec<GeneratedQuestion> = serde_json::from_value(value)
        .map_err(|e| malformed(format!("reply does not match the question format: {}", e)))?;

    if questions.len() != expected {
        return Err(malformed(format!(
            "expected {} questions, got {}",
            expected,
            questions.len()
        )));
    }

    for (i, q) in questions.iter().enumerate() {
        validate(i, q, question_type)?;
    }
    Ok(questions)
}
