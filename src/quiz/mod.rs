//! Quiz generation and retrieval
//!
//! A quiz is authored by the generation service from the content of one or
//! more stored documents. The reply is validated in full before the quiz and
//! its questions are written in a single transaction.

mod parse;
mod prompt;

pub use parse::{parse_generated_questions, GeneratedQuestion};
pub use prompt::{build_user_prompt, SYSTEM_PROMPT};

use crate::db::{now_timestamp, Database, Question, Quiz};
use crate::error::{Error, Result};
use crate::generate::GenerationService;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Kind of question a quiz contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
}

impl QuestionType {
    /// Stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::TrueFalse => "true_false",
        }
    }

    /// Wording used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "multiple-choice",
            QuestionType::TrueFalse => "true/false",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mcq" => Ok(QuestionType::Mcq),
            "true_false" | "true/false" => Ok(QuestionType::TrueFalse),
            other => Err(Error::InvalidArgument(format!(
                "Unknown question type '{}'; expected 'mcq' or 'true_false'",
                other
            ))),
        }
    }
}

/// Input for quiz creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizRequest {
    pub file_ids: Vec<String>,
    pub name: String,
    pub difficulty: String,
    pub topic: String,
    pub question_count: u32,
    pub question_type: QuestionType,
    pub custom_instructions: Option<String>,
}

/// A question as shown to quiz takers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicQuestion {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            question_id: q.question_id,
            question: q.question,
            options: q.options,
        }
    }
}

/// Quiz details without correct answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetails {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}

/// A freshly created quiz with its questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// One page of the quiz listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPage {
    pub quizzes: Vec<Quiz>,
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
}

/// Creates quizzes through the generation service
#[derive(Clone)]
pub struct QuizGenerator {
    db: Database,
    generator: Arc<dyn GenerationService>,
}

impl QuizGenerator {
    pub fn new(db: Database, generator: Arc<dyn GenerationService>) -> Self {
        Self { db, generator }
    }

    /// Join the content of the requested documents in request order
    async fn resolve_context(&self, file_ids: &[String]) -> Result<String> {
        let unique: HashSet<&String> = file_ids.iter().collect();
        if unique.len() != file_ids.len() {
            return Err(Error::InvalidArgument(
                "file_ids contains duplicate entries".to_string(),
            ));
        }

        let docs = self.db.get_documents(file_ids).await?;
        if docs.len() != file_ids.len() {
            let found: HashSet<&str> = docs.iter().map(|d| d.file_id.as_str()).collect();
            let missing: Vec<&str> = file_ids
                .iter()
                .map(String::as_str)
                .filter(|id| !found.contains(id))
                .collect();
            return Err(Error::InvalidArgument(format!(
                "Unknown file ids: {}",
                missing.join(", ")
            )));
        }

        let context = file_ids
            .iter()
            .filter_map(|id| docs.iter().find(|d| &d.file_id == id))
            .filter_map(|d| d.content.as_deref())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(context)
    }

    /// Generate, validate and store a new quiz
    pub async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<CreatedQuiz> {
        if request.file_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "At least one file id is required".to_string(),
            ));
        }
        if request.question_count < 1 {
            return Err(Error::InvalidArgument(
                "number_of_questions must be at least 1".to_string(),
            ));
        }

        let context = self.resolve_context(&request.file_ids).await?;
        if context.trim().is_empty() {
            warn!("Quiz '{}' is being generated from empty content", request.name);
        }

        let user_prompt = build_user_prompt(request, &context);
        debug!(
            "Requesting {} {} questions from {}",
            request.question_count,
            request.question_type,
            self.generator.model_name()
        );
        let raw = self.generator.generate(SYSTEM_PROMPT, &user_prompt).await?;

        let generated = parse_generated_questions(
            &raw,
            request.question_count as usize,
            request.question_type,
        )?;

        let quiz = Quiz {
            quiz_id: Uuid::new_v4().to_string(),
            name: request.name.clone(),
            difficulty: request.difficulty.clone(),
            topic: request.topic.clone(),
            number_of_questions: i64::from(request.question_count),
            question_type: request.question_type.as_str().to_string(),
            custom_instructions: request.custom_instructions.clone(),
            created_at: now_timestamp(),
        };

        let questions: Vec<Question> = generated
            .into_iter()
            .enumerate()
            .map(|(i, g)| Question {
                question_id: format!("{}_q{}", quiz.quiz_id, i + 1),
                quiz_id: quiz.quiz_id.clone(),
                position: i as i64 + 1,
                question: g.question,
                options: g.options,
                correct_answer: g.correct_answer,
            })
            .collect();

        self.db.insert_quiz_with_questions(&quiz, &questions).await?;
        info!(
            "Created quiz {} '{}' with {} questions",
            quiz.quiz_id,
            quiz.name,
            questions.len()
        );

        Ok(CreatedQuiz { quiz, questions })
    }
}

/// Read-only access to stored quizzes; needs no generation service
#[derive(Clone)]
pub struct QuizCatalog {
    db: Database,
}

impl QuizCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Quiz details for taking it; answers are withheld
    pub async fn get_quiz(&self, quiz_id: &str) -> Result<QuizDetails> {
        let quiz = self
            .db
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| Error::not_found("Quiz", quiz_id))?;
        let questions = self.db.get_questions(quiz_id).await?;

        Ok(QuizDetails {
            quiz,
            questions: questions.into_iter().map(PublicQuestion::from).collect(),
        })
    }

    /// Newest quizzes first
    pub async fn list_quizzes(&self, page: u32, limit: u32) -> Result<QuizPage> {
        if page < 1 || limit < 1 {
            return Err(Error::InvalidArgument(
                "Page and limit must be positive integers".to_string(),
            ));
        }

        let offset = (i64::from(page) - 1) * i64::from(limit);
        let quizzes = self.db.list_quizzes(i64::from(limit), offset).await?;
        let total_items = self.db.count_quizzes().await?.max(0) as u64;

        Ok(QuizPage {
            quizzes,
            page,
            limit,
            total_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MIME_PLAIN_TEXT;
    use crate::index::DocumentIndex;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replies with a fixed string and records the prompts it saw
    struct ScriptedGenerator {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(Error::GenerationService("unavailable".to_string())),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedGenerator {
        async fn generate(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user_prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::GenerationService(e.to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    const TWO_TF: &str = r#"[
        {"question_id": "1", "question": "SEO means search engine optimization.", "options": ["True", "False"], "correct_answer": "True"},
        {"question_id": "2", "question": "SEO is a database.", "options": ["True", "False"], "correct_answer": "False"}
    ]"#;

    async fn setup(generator: ScriptedGenerator) -> (QuizGenerator, Arc<ScriptedGenerator>, Database, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = Database::new(&tmp.path().join("quiz.db")).await.unwrap();
        let index = DocumentIndex::new(db.clone());
        index
            .ingest("a.txt", MIME_PLAIN_TEXT, b"SEO means search engine optimization")
            .await
            .unwrap();
        index
            .ingest("b.txt", MIME_PLAIN_TEXT, b"Backlinks improve ranking")
            .await
            .unwrap();

        let generator = Arc::new(generator);
        let quizzes = QuizGenerator::new(db.clone(), generator.clone());
        (quizzes, generator, db, tmp)
    }

    fn request(file_ids: &[&str], count: u32) -> CreateQuizRequest {
        CreateQuizRequest {
            file_ids: file_ids.iter().map(|s| s.to_string()).collect(),
            name: "SEO basics".to_string(),
            difficulty: "easy".to_string(),
            topic: "seo".to_string(),
            question_count: count,
            question_type: QuestionType::TrueFalse,
            custom_instructions: None,
        }
    }

    #[test]
    fn test_question_type_parse() {
        assert_eq!("mcq".parse::<QuestionType>().unwrap(), QuestionType::Mcq);
        assert_eq!("True/False".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert_eq!("true_false".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[tokio::test]
    async fn test_create_quiz() {
        let (quizzes, generator, db, _tmp) = setup(ScriptedGenerator::replying(TWO_TF)).await;

        let created = quizzes
            .create_quiz(&request(&["file002", "file001"], 2))
            .await
            .unwrap();
        assert_eq!(created.questions.len(), 2);
        assert_eq!(
            created.questions[1].question_id,
            format!("{}_q2", created.quiz.quiz_id)
        );
        assert!(Uuid::parse_str(&created.quiz.quiz_id).is_ok());

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        let backlinks = prompt.find("Backlinks").unwrap();
        let seo = prompt.find("SEO means").unwrap();
        assert!(backlinks < seo);
        assert!(prompt.contains("Backlinks improve ranking\n\nSEO means"));

        let stored = db.get_questions(&created.quiz.quiz_id).await.unwrap();
        assert_eq!(stored, created.questions);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let (quizzes, generator, _db, _tmp) = setup(ScriptedGenerator::replying(TWO_TF)).await;

        for req in [
            request(&[], 2),
            request(&["file001"], 0),
            request(&["file001", "file404"], 2),
            request(&["file001", "file001"], 2),
        ] {
            let err = quizzes.create_quiz(&req).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);
        }
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_persists_nothing() {
        let (quizzes, _generator, db, _tmp) = setup(ScriptedGenerator::failing()).await;

        let err = quizzes.create_quiz(&request(&["file001"], 2)).await.unwrap_err();
        assert!(matches!(err, Error::GenerationService(_)));
        assert_eq!(db.count_quizzes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_quiz_hides_answers() {
        let (quizzes, _generator, db, _tmp) = setup(ScriptedGenerator::replying(TWO_TF)).await;
        let created = quizzes.create_quiz(&request(&["file001"], 2)).await.unwrap();

        let catalog = QuizCatalog::new(db);
        let details = catalog.get_quiz(&created.quiz.quiz_id).await.unwrap();
        assert_eq!(details.questions.len(), 2);
        let json = serde_json::to_string(&details).unwrap();
        assert!(!json.contains("correct_answer"));
        assert!(json.contains("\"quiz_id\""));

        let err = catalog.get_quiz("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_quizzes() {
        let (quizzes, _generator, db, _tmp) = setup(ScriptedGenerator::replying(TWO_TF)).await;
        for _ in 0..3 {
            quizzes.create_quiz(&request(&["file001"], 2)).await.unwrap();
        }

        let catalog = QuizCatalog::new(db);
        let page = catalog.list_quizzes(2, 2).await.unwrap();
        assert_eq!(page.quizzes.len(), 1);
        assert_eq!(page.total_items, 3);

        assert!(matches!(
            catalog.list_quizzes(0, 10).await,
            Err(Error::InvalidArgument(_))
        ));
    }
}
