//! Quiz and question storage

use super::{map_unique_violation, Database};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::debug;

/// A stored quiz
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub quiz_id: String,
    pub name: String,
    pub difficulty: String,
    pub topic: String,
    pub number_of_questions: i64,
    pub question_type: String,
    pub custom_instructions: Option<String>,
    pub created_at: String,
}

/// A stored question row; options are kept as a JSON array
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub question_id: String,
    pub quiz_id: String,
    pub position: i64,
    pub question: String,
    pub options_json: String,
    pub correct_answer: String,
}

/// A question with its options decoded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub question_id: String,
    pub quiz_id: String,
    pub position: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = Error;

    fn try_from(row: QuestionRow) -> Result<Self> {
        Ok(Self {
            options: serde_json::from_str(&row.options_json)?,
            question_id: row.question_id,
            quiz_id: row.quiz_id,
            position: row.position,
            question: row.question,
            correct_answer: row.correct_answer,
        })
    }
}

impl Database {
    // ===== Quiz Operations =====

    /// Insert a quiz and all of its questions atomically
    pub async fn insert_quiz_with_questions(&self, quiz: &Quiz, questions: &[Question]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (quiz_id, name, difficulty, topic, number_of_questions,
                                 question_type, custom_instructions, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&quiz.quiz_id)
        .bind(&quiz.name)
        .bind(&quiz.difficulty)
        .bind(&quiz.topic)
        .bind(quiz.number_of_questions)
        .bind(&quiz.question_type)
        .bind(&quiz.custom_instructions)
        .bind(&quiz.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &format!("Quiz '{}'", quiz.quiz_id)))?;

        for question in questions {
            sqlx::query(
                r#"
                INSERT INTO questions (question_id, quiz_id, position, question, options_json, correct_answer)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&question.question_id)
            .bind(&question.quiz_id)
            .bind(question.position)
            .bind(&question.question)
            .bind(serde_json::to_string(&question.options)?)
            .bind(&question.correct_answer)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, &format!("Question '{}'", question.question_id)))?;
        }

        tx.commit().await?;
        debug!("Stored quiz {} with {} questions", quiz.quiz_id, questions.len());
        Ok(())
    }

    /// Get quiz by ID
    pub async fn get_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(quiz)
    }

    /// Questions of a quiz in position order
    pub async fn get_questions(&self, quiz_id: &str) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT * FROM questions WHERE quiz_id = ? ORDER BY position",
        )
        .bind(quiz_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Question::try_from).collect()
    }

    /// One page of quizzes, newest first
    pub async fn list_quizzes(&self, limit: i64, offset: i64) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            "SELECT * FROM quizzes ORDER BY created_at DESC, quiz_id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;
        Ok(quizzes)
    }

    /// Total number of quizzes
    pub async fn count_quizzes(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
