//! Submission storage

use super::Database;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::debug;

/// One recorded answer
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub submission_id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub question_id: String,
    pub selected_answer: String,
    pub is_correct: bool,
    pub created_at: String,
}

impl Database {
    // ===== Submission Operations =====

    /// Append a batch of submissions atomically
    pub async fn insert_submissions(&self, submissions: &[Submission]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        for s in submissions {
            sqlx::query(
                r#"
                INSERT INTO quiz_submissions (submission_id, quiz_id, user_id, question_id,
                                              selected_answer, is_correct, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&s.submission_id)
            .bind(&s.quiz_id)
            .bind(&s.user_id)
            .bind(&s.question_id)
            .bind(&s.selected_answer)
            .bind(s.is_correct)
            .bind(&s.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Stored {} submissions", submissions.len());
        Ok(())
    }

    /// Submissions for a quiz in insertion order, optionally bounded by
    /// `from <= created_at < until` (both in storage timestamp form)
    pub async fn list_quiz_submissions(
        &self,
        quiz_id: &str,
        from: Option<&str>,
        until: Option<&str>,
    ) -> Result<Vec<Submission>> {
        let mut sql = String::from("SELECT * FROM quiz_submissions WHERE quiz_id = ?");
        if from.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if until.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at, rowid");

        let mut query = sqlx::query_as::<_, Submission>(&sql).bind(quiz_id);
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(until) = until {
            query = query.bind(until);
        }

        Ok(query.fetch_all(self.pool()).await?)
    }

    /// Submissions by a user in insertion order
    pub async fn list_user_submissions(&self, user_id: &str) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            "SELECT * FROM quiz_submissions WHERE user_id = ? ORDER BY created_at, rowid",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::setup_test_db;

    fn submission(id: &str, quiz: &str, user: &str, correct: bool, at: &str) -> Submission {
        Submission {
            submission_id: id.to_string(),
            quiz_id: quiz.to_string(),
            user_id: user.to_string(),
            question_id: format!("{}_q1", quiz),
            selected_answer: "True".to_string(),
            is_correct: correct,
            created_at: at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submission_filters() {
        let (db, _tmp) = setup_test_db().await;
        db.insert_submissions(&[
            submission("s1", "qa", "u1", true, "2024-05-01T10:00:00.000000Z"),
            submission("s2", "qa", "u2", false, "2024-05-02T10:00:00.000000Z"),
            submission("s3", "qb", "u1", true, "2024-05-03T10:00:00.000000Z"),
        ])
        .await
        .unwrap();

        let all = db.list_quiz_submissions("qa", None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].is_correct);
        assert!(!all[1].is_correct);

        let bounded = db
            .list_quiz_submissions("qa", Some("2024-05-02T00:00:00.000000Z"), None)
            .await
            .unwrap();
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].submission_id, "s2");

        let bounded = db
            .list_quiz_submissions("qa", None, Some("2024-05-02T00:00:00.000000Z"))
            .await
            .unwrap();
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].submission_id, "s1");

        let user = db.list_user_submissions("u1").await.unwrap();
        let ids: Vec<_> = user.iter().map(|s| s.submission_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let (db, _tmp) = setup_test_db().await;
        let at = "2024-05-01T10:00:00.000000Z";

        // Duplicate primary key in the same batch
        let err = db
            .insert_submissions(&[
                submission("dup", "qa", "u1", true, at),
                submission("dup", "qa", "u1", true, at),
            ])
            .await;
        assert!(err.is_err());
        assert!(db.list_quiz_submissions("qa", None, None).await.unwrap().is_empty());
    }
}
