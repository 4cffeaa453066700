//! Answer scoring and quiz results

use crate::db::{now_timestamp, Database, Submission};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Identity of the person answering a quiz, supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument("user id must not be empty".to_string()));
        }
        Ok(Self(id))
    }

    /// A fresh identity for callers that have none
    pub fn anonymous() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selected answer for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub selected_answer: String,
}

/// Outcome of a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub quiz_id: String,
    pub user_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub submission_ids: Vec<String>,
}

/// One user's answers to a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResult {
    pub user_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// All results of a quiz grouped by user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResults {
    pub quiz_id: String,
    pub results: Vec<UserResult>,
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `score / total` as a percentage with two decimals
pub fn percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(f64::from(score) / f64::from(total) * 100.0)
}

/// Scores submissions against stored answers
#[derive(Clone)]
pub struct GradingEngine {
    db: Database,
}

impl GradingEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Score a batch of answers and record one submission per answer
    pub async fn submit(&self, quiz_id: &str, user_id: &UserId, answers: &[Answer]) -> Result<GradeReport> {
        if self.db.get_quiz(quiz_id).await?.is_none() {
            return Err(Error::not_found("Quiz", quiz_id));
        }
        if answers.is_empty() {
            return Err(Error::InvalidArgument("No answers submitted".to_string()));
        }

        let questions = self.db.get_questions(quiz_id).await?;
        let correct: HashMap<&str, &str> = questions
            .iter()
            .map(|q| (q.question_id.as_str(), q.correct_answer.as_str()))
            .collect();

        let mut seen = HashSet::new();
        let created_at = now_timestamp();
        let mut submissions = Vec::with_capacity(answers.len());
        let mut score = 0u32;

        for answer in answers {
            let expected = correct.get(answer.question_id.as_str()).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Question '{}' does not belong to quiz '{}'",
                    answer.question_id, quiz_id
                ))
            })?;
            if !seen.insert(answer.question_id.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "Question '{}' answered more than once",
                    answer.question_id
                )));
            }

            let is_correct = *expected == answer.selected_answer;
            if is_correct {
                score += 1;
            }

            submissions.push(Submission {
                submission_id: Uuid::new_v4().to_string(),
                quiz_id: quiz_id.to_string(),
                user_id: user_id.to_string(),
                question_id: answer.question_id.clone(),
                selected_answer: answer.selected_answer.clone(),
                is_correct,
                created_at: created_at.clone(),
            });
        }

        self.db.insert_submissions(&submissions).await?;

        let total = submissions.len() as u32;
        info!("User {} scored {}/{} on quiz {}", user_id, score, total, quiz_id);

        Ok(GradeReport {
            quiz_id: quiz_id.to_string(),
            user_id: user_id.to_string(),
            score,
            total_questions: total,
            percentage: percentage(score, total),
            submission_ids: submissions.into_iter().map(|s| s.submission_id).collect(),
        })
    }

    /// Every user's submissions for a quiz
    pub async fn quiz_results(&self, quiz_id: &str) -> Result<QuizResults> {
        if self.db.get_quiz(quiz_id).await?.is_none() {
            return Err(Error::not_found("Quiz", quiz_id));
        }

        let submissions = self.db.list_quiz_submissions(quiz_id, None, None).await?;
        if submissions.is_empty() {
            return Err(Error::NotFound(format!(
                "No submissions found for quiz '{}'",
                quiz_id
            )));
        }

        let mut results: Vec<UserResult> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for s in submissions {
            let idx = *slots.entry(s.user_id.clone()).or_insert_with(|| {
                results.push(UserResult {
                    user_id: s.user_id.clone(),
                    score: 0,
                    total_questions: 0,
                    percentage: 0.0,
                    answers: Vec::new(),
                });
                results.len() - 1
            });
            let entry = &mut results[idx];
            entry.total_questions += 1;
            if s.is_correct {
                entry.score += 1;
            }
            entry.answers.push(AnswerRecord {
                question_id: s.question_id,
                selected_answer: s.selected_answer,
                is_correct: s.is_correct,
            });
        }

        for r in &mut results {
            r.percentage = percentage(r.score, r.total_questions);
        }

        Ok(QuizResults {
            quiz_id: quiz_id.to_string(),
            results,
        })
    }
}
