//! Quiz and user analytics over recorded submissions

use crate::db::{format_timestamp, Database, Submission};
use crate::error::{Error, Result};
use crate::grading::percentage;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Attempts and correct answers for one group of submissions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupStats {
    pub id: String,
    pub attempts: u32,
    pub correct: u32,
    pub accuracy_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnalytics {
    pub quiz_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_submissions: u32,
    pub total_correct: u32,
    pub accuracy_pct: f64,
    pub per_question: Vec<GroupStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub user_id: String,
    pub total_submissions: u32,
    pub total_correct: u32,
    pub accuracy_pct: f64,
    pub distinct_quizzes_attempted: u32,
    pub per_quiz: Vec<GroupStats>,
}

/// Group submissions by key, keeping first-seen order
pub fn group_stats<'a, F>(submissions: &'a [Submission], key: F) -> Vec<GroupStats>
where
    F: Fn(&'a Submission) -> &'a str,
{
    let mut groups: Vec<GroupStats> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for s in submissions {
        let k = key(s);
        let idx = *slots.entry(k).or_insert_with(|| {
            groups.push(GroupStats {
                id: k.to_string(),
                attempts: 0,
                correct: 0,
                accuracy_pct: 0.0,
            });
            groups.len() - 1
        });
        groups[idx].attempts += 1;
        if s.is_correct {
            groups[idx].correct += 1;
        }
    }

    for g in &mut groups {
        g.accuracy_pct = percentage(g.correct, g.attempts);
    }
    groups
}

fn totals(submissions: &[Submission]) -> (u32, u32) {
    let total = submissions.len() as u32;
    let correct = submissions.iter().filter(|s| s.is_correct).count() as u32;
    (total, correct)
}

/// Parse an optional `YYYY-MM-DD` bound
pub fn parse_date(label: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                Error::InvalidArgument(format!(
                    "Invalid {} '{}'; use YYYY-MM-DD",
                    label, v
                ))
            })
        })
        .transpose()
}

/// Convert inclusive day bounds to `[from, until)` storage timestamps
fn day_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(Option<String>, Option<String>)> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(Error::InvalidArgument(format!(
                "start_date {} is after end_date {}",
                s, e
            )));
        }
    }

    let from = start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| format_timestamp(dt.and_utc()));
    let until = match end {
        Some(d) => {
            let next = d.checked_add_days(Days::new(1)).ok_or_else(|| {
                Error::InvalidArgument(format!("end_date {} is out of range", d))
            })?;
            next.and_hms_opt(0, 0, 0).map(|dt| format_timestamp(dt.and_utc()))
        }
        None => None,
    };
    Ok((from, until))
}

/// Aggregates submissions
#[derive(Clone)]
pub struct AnalyticsAggregator {
    db: Database,
}

impl AnalyticsAggregator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Statistics for one quiz, optionally limited to a date range
    pub async fn quiz_analytics(
        &self,
        quiz_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<QuizAnalytics> {
        if self.db.get_quiz(quiz_id).await?.is_none() {
            return Err(Error::not_found("Quiz", quiz_id));
        }

        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        let (from, until) = day_bounds(start, end)?;
        debug!("Quiz {} analytics window {:?}..{:?}", quiz_id, from, until);

        let submissions = self
            .db
            .list_quiz_submissions(quiz_id, from.as_deref(), until.as_deref())
            .await?;
        if submissions.is_empty() {
            return Err(Error::NotFound(format!(
                "No submissions found for quiz '{}' in the given date range",
                quiz_id
            )));
        }

        let (total, correct) = totals(&submissions);
        Ok(QuizAnalytics {
            quiz_id: quiz_id.to_string(),
            start_date: start.map(|d| d.to_string()),
            end_date: end.map(|d| d.to_string()),
            total_submissions: total,
            total_correct: correct,
            accuracy_pct: percentage(correct, total),
            per_question: group_stats(&submissions, |s| s.question_id.as_str()),
        })
    }

    /// Statistics across every quiz a user answered
    pub async fn user_analytics(&self, user_id: &str) -> Result<UserAnalytics> {
        let submissions = self.db.list_user_submissions(user_id).await?;
        if submissions.is_empty() {
            return Err(Error::NotFound(format!(
                "No submissions found for user '{}'",
                user_id
            )));
        }

        let (total, correct) = totals(&submissions);
        let quizzes: HashSet<&str> = submissions.iter().map(|s| s.quiz_id.as_str()).collect();

        Ok(UserAnalytics {
            user_id: user_id.to_string(),
            total_submissions: total,
            total_correct: correct,
            accuracy_pct: percentage(correct, total),
            distinct_quizzes_attempted: quizzes.len() as u32,
            per_quiz: group_stats(&submissions, |s| s.quiz_id.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{now_timestamp, Quiz};
    use tempfile::TempDir;

    fn submission(n: u32, quiz: &str, user: &str, question: &str, correct: bool, at: &str) -> Submission {
        Submission {
            submission_id: format!("s{}", n),
            quiz_id: quiz.to_string(),
            user_id: user.to_string(),
            question_id: question.to_string(),
            selected_answer: "x".to_string(),
            is_correct: correct,
            created_at: at.to_string(),
        }
    }

    async fn setup() -> (AnalyticsAggregator, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = Database::new(&tmp.path().join("analytics.db")).await.unwrap();

        for quiz_id in ["qa", "qb", "qc"] {
            let quiz = Quiz {
                quiz_id: quiz_id.to_string(),
                name: quiz_id.to_string(),
                difficulty: "easy".to_string(),
                topic: "t".to_string(),
                number_of_questions: 2,
                question_type: "true_false".to_string(),
                custom_instructions: None,
                created_at: now_timestamp(),
            };
            db.insert_quiz_with_questions(&quiz, &[]).await.unwrap();
        }

        db.insert_submissions(&[
            submission(1, "qa", "u1", "qa_q2", true, "2024-03-01T09:00:00.000000Z"),
            submission(2, "qa", "u1", "qa_q1", false, "2024-03-01T09:00:00.000000Z"),
            submission(3, "qa", "u2", "qa_q2", true, "2024-03-05T23:59:59.999999Z"),
            submission(4, "qa", "u2", "qa_q1", true, "2024-03-06T00:00:00.000000Z"),
            submission(5, "qb", "u1", "qb_q1", true, "2024-03-07T12:00:00.000000Z"),
        ])
        .await
        .unwrap();

        (AnalyticsAggregator::new(db), tmp)
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("start_date", None).unwrap().is_none());
        assert_eq!(
            parse_date("start_date", Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        for bad in ["2024-13-01", "03/01/2024", "2023-02-29", "yesterday"] {
            assert!(matches!(
                parse_date("start_date", Some(bad)),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_group_stats_first_seen_order() {
        let subs = vec![
            submission(1, "q", "u", "b", true, ""),
            submission(2, "q", "u", "a", false, ""),
            submission(3, "q", "u", "b", false, ""),
        ];
        let groups = group_stats(&subs, |s| s.question_id.as_str());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "b");
        assert_eq!(groups[0].attempts, 2);
        assert_eq!(groups[0].accuracy_pct, 50.0);
        assert_eq!(groups[1].accuracy_pct, 0.0);
    }

    #[test]
    fn test_group_stats_many_interleaved_groups() {
        let subs: Vec<Submission> = (0..600)
            .map(|n| {
                let question = format!("q_q{}", (n * 7) % 200);
                submission(n, "q", "u", &question, n % 3 == 0, "")
            })
            .collect();
        let groups = group_stats(&subs, |s| s.question_id.as_str());
        assert_eq!(groups.len(), 200);
        assert_eq!(groups[0].id, "q_q0");
        assert_eq!(groups[1].id, "q_q7");
        assert!(groups.iter().all(|g| g.attempts == 3));
        let correct: u32 = groups.iter().map(|g| g.correct).sum();
        assert_eq!(correct, 200);
    }

    #[tokio::test]
    async fn test_quiz_analytics_unbounded() {
        let (analytics, _tmp) = setup().await;
        let report = analytics.quiz_analytics("qa", None, None).await.unwrap();
        assert_eq!(report.total_submissions, 4);
        assert_eq!(report.total_correct, 3);
        assert_eq!(report.accuracy_pct, 75.0);
        assert_eq!(report.per_question[0].id, "qa_q2");
        assert_eq!(report.per_question[0].accuracy_pct, 100.0);
        assert_eq!(report.per_question[1].accuracy_pct, 50.0);
    }

    #[tokio::test]
    async fn test_end_date_covers_whole_day() {
        let (analytics, _tmp) = setup().await;
        let report = analytics
            .quiz_analytics("qa", Some("2024-03-05"), Some("2024-03-05"))
            .await
            .unwrap();
        assert_eq!(report.total_submissions, 1);
        assert_eq!(report.start_date.as_deref(), Some("2024-03-05"));

        let report = analytics
            .quiz_analytics("qa", None, Some("2024-03-05"))
            .await
            .unwrap();
        assert_eq!(report.total_submissions, 3);
    }

    #[tokio::test]
    async fn test_quiz_analytics_errors() {
        let (analytics, _tmp) = setup().await;

        assert!(matches!(
            analytics.quiz_analytics("missing", None, None).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            analytics.quiz_analytics("qa", Some("2024-3-xx"), None).await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            analytics.quiz_analytics("qa", Some("2024-03-06"), Some("2024-03-01")).await,
            Err(Error::InvalidArgument(_))
        ));
        // Existing quiz without submissions
        assert!(matches!(
            analytics.quiz_analytics("qc", None, None).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            analytics.quiz_analytics("qa", Some("2025-01-01"), None).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_user_analytics() {
        let (analytics, _tmp) = setup().await;

        let report = analytics.user_analytics("u1").await.unwrap();
        assert_eq!(report.total_submissions, 3);
        assert_eq!(report.total_correct, 2);
        assert_eq!(report.accuracy_pct, 66.67);
        assert_eq!(report.distinct_quizzes_attempted, 2);
        assert_eq!(report.per_quiz[0].id, "qa");
        assert_eq!(report.per_quiz[1].id, "qb");

        assert!(matches!(
            analytics.user_analytics("ghost").await,
            Err(Error::NotFound(_))
        ));
    }
}
