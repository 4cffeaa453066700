//! Quiz commands: create, show, list, submit, results

use crate::error::{Error, Result};
use crate::grading::{Answer, GradeReport, GradingEngine, QuizResults, UserId};
use crate::progress::start_spinner;
use crate::quiz::{CreateQuizRequest, CreatedQuiz, QuizCatalog, QuizDetails, QuizGenerator, QuizPage};
use std::path::Path;
use tracing::info;

/// Generate and store a quiz, showing a spinner while the model works
pub async fn cmd_quiz_create(generator: &QuizGenerator, request: &CreateQuizRequest) -> Result<CreatedQuiz> {
    info!(
        "Creating quiz '{}' from {} document(s)",
        request.name,
        request.file_ids.len()
    );

    let spinner = start_spinner("Generating questions");
    let result = generator.create_quiz(request).await;
    match &result {
        Ok(_) => spinner.finish_with_message("Questions generated"),
        Err(_) => spinner.abandon_with_message("Generation failed"),
    }
    result
}

pub async fn cmd_quiz_show(catalog: &QuizCatalog, quiz_id: &str) -> Result<QuizDetails> {
    catalog.get_quiz(quiz_id).await
}

pub async fn cmd_quiz_list(catalog: &QuizCatalog, page: u32, limit: u32) -> Result<QuizPage> {
    catalog.list_quizzes(page, limit).await
}

/// Parse a `QUESTION_ID=ANSWER` argument
pub fn parse_answer_arg(arg: &str) -> Result<Answer> {
    let (question_id, selected) = arg.split_once('=').ok_or_else(|| {
        Error::InvalidArgument(format!(
            "Answer '{}' must look like QUESTION_ID=ANSWER",
            arg
        ))
    })?;
    let question_id = question_id.trim();
    if question_id.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "Answer '{}' has no question id",
            arg
        )));
    }
    Ok(Answer {
        question_id: question_id.to_string(),
        selected_answer: selected.to_string(),
    })
}

/// Read answers from a JSON file holding `[{question_id, selected_answer}]`
pub fn load_answers_file(path: &Path) -> Result<Vec<Answer>> {
    let content = std::fs::read_to_string(path)?;
    let answers: Vec<Answer> = serde_json::from_str(&content).map_err(|e| {
        Error::InvalidArgument(format!(
            "Answers file {} is not a list of answers: {}",
            path.display(),
            e
        ))
    })?;
    Ok(answers)
}

/// Submit answers for a user, or an anonymous one when none is given
pub async fn cmd_quiz_submit(
    engine: &GradingEngine,
    quiz_id: &str,
    user: Option<String>,
    answers: &[Answer],
) -> Result<GradeReport> {
    let user_id = match user {
        Some(id) => UserId::new(id)?,
        None => UserId::anonymous(),
    };
    engine.submit(quiz_id, &user_id, answers).await
}

pub async fn cmd_quiz_results(engine: &GradingEngine, quiz_id: &str) -> Result<QuizResults> {
    engine.quiz_results(quiz_id).await
}

pub fn print_created_quiz(created: &CreatedQuiz) {
    println!("✓ Created quiz '{}'", created.quiz.name);
    println!("  ID: {}", created.quiz.quiz_id);
    println!(
        "  Questions: {} ({})",
        created.questions.len(),
        created.quiz.question_type
    );
}

pub fn print_quiz(details: &QuizDetails) {
    let quiz = &details.quiz;
    println!("\n📝 {} [{}]\n", quiz.name, quiz.quiz_id);
    println!("Topic: {}", quiz.topic);
    println!("Difficulty: {}", quiz.difficulty);
    println!("Type: {}", quiz.question_type);
    if let Some(instructions) = &quiz.custom_instructions {
        println!("Instructions: {}", instructions);
    }
    println!();

    for (i, q) in details.questions.iter().enumerate() {
        println!("{}. {}", i + 1, q.question);
        println!("   ID: {}", q.question_id);
        for option in &q.options {
            println!("   - {}", option);
        }
        println!();
    }
}

pub fn print_quiz_list(page: &QuizPage) {
    println!("\n📚 Quizzes (page {}, {} total)\n", page.page, page.total_items);

    if page.quizzes.is_empty() {
        println!("No quizzes on this page. Use 'study-helper quiz create' to add one.");
        return;
    }

    for quiz in &page.quizzes {
        println!("• {} [{}]", quiz.name, quiz.question_type);
        println!("  ID: {}", quiz.quiz_id);
        println!(
            "  Topic: {}, Difficulty: {}, Questions: {}",
            quiz.topic, quiz.difficulty, quiz.number_of_questions
        );
        println!("  Created: {}", quiz.created_at);
        println!();
    }
}

pub fn print_grade_report(report: &GradeReport) {
    println!("✓ Submitted answers for quiz {}", report.quiz_id);
    println!("  User: {}", report.user_id);
    println!(
        "  Score: {}/{} ({:.2}%)",
        report.score, report.total_questions, report.percentage
    );
}

pub fn print_quiz_results(results: &QuizResults) {
    println!("\n🏁 Results for quiz {}\n", results.quiz_id);
    for r in &results.results {
        println!(
            "• {}: {}/{} ({:.2}%)",
            r.user_id, r.score, r.total_questions, r.percentage
        );
        for a in &r.answers {
            let mark = if a.is_correct { "✓" } else { "✗" };
            println!("    {} {} → {}", mark, a.question_id, a.selected_answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Database;
    use crate::generate::create_generator;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_show_and_list_without_generation_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.generation.base_url = "not a url".to_string();
        assert!(create_generator(&config.generation).is_err());

        let db = Database::new(&tmp.path().join("quiz.db")).await.unwrap();
        let catalog = QuizCatalog::new(db);

        let page = cmd_quiz_list(&catalog, 1, 10).await.unwrap();
        assert!(page.quizzes.is_empty());
        assert_eq!(page.total_items, 0);

        let err = cmd_quiz_show(&catalog, "missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_parse_answer_arg() {
        let a = parse_answer_arg("q_q1=A. Paris = capital").unwrap();
        assert_eq!(a.question_id, "q_q1");
        assert_eq!(a.selected_answer, "A. Paris = capital");

        assert!(matches!(parse_answer_arg("no-separator"), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_answer_arg("=True"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_load_answers_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("answers.json");
        std::fs::write(
            &path,
            r#"[{"question_id": "x_q1", "selected_answer": "True"}]"#,
        )
        .unwrap();
        let answers = load_answers_file(&path).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].selected_answer, "True");

        std::fs::write(&path, r#"{"answers": []}"#).unwrap();
        assert!(matches!(load_answers_file(&path), Err(Error::InvalidArgument(_))));
    }
}
