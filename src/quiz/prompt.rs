//! Prompt construction for quiz generation

use super::{CreateQuizRequest, QuestionType};

pub const SYSTEM_PROMPT: &str = "You are a quiz author. You write questions strictly from the \
provided study material and reply with a single JSON array and nothing else.";

fn format_contract(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Mcq => {
            r#"Each question must have exactly 4 options labelled "A. ", "B. ", "C. " and "D. ".
The correct_answer must be copied verbatim from one of the options.

Example:
[
  {
    "question_id": "1",
    "question": "What does SEO stand for?",
    "options": ["A. Search Engine Optimization", "B. Site Entry Order", "C. Secure Email Output", "D. Social Engagement Overview"],
    "correct_answer": "A. Search Engine Optimization"
  }
]"#
        }
        QuestionType::TrueFalse => {
            r#"Each question is a statement whose options are exactly ["True", "False"].
The correct_answer must be either "True" or "False".

Example:
[
  {
    "question_id": "1",
    "question": "SEO stands for Search Engine Optimization.",
    "options": ["True", "False"],
    "correct_answer": "True"
  }
]"#
        }
    }
}

/// Build the user prompt for a quiz request over the given context
pub fn build_user_prompt(request: &CreateQuizRequest, context: &str) -> String {
    let mut prompt = format!(
        "Generate {count} {kind} questions about the topic \"{topic}\" at {difficulty} difficulty.\n\n",
        count = request.question_count,
        kind = request.question_type.label(),
        topic = request.topic,
        difficulty = request.difficulty,
    );

    prompt.push_str("Study material:\n\"\"\"\n");
    prompt.push_str(context);
    prompt.push_str("\n\"\"\"\n\n");

    if let Some(instructions) = request
        .custom_instructions
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        prompt.push_str("Additional instructions: ");
        prompt.push_str(instructions);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "Reply with a JSON array of exactly {} objects. Each object has exactly the fields \
         \"question_id\", \"question\", \"options\" and \"correct_answer\".\n",
        request.question_count
    ));
    prompt.push_str(format_contract(request.question_type));
    prompt
}
