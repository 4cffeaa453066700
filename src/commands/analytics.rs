//! Analytics commands

use crate::analytics::{AnalyticsAggregator, GroupStats, QuizAnalytics, UserAnalytics};
use crate::error::Result;

pub async fn cmd_quiz_analytics(
    aggregator: &AnalyticsAggregator,
    quiz_id: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<QuizAnalytics> {
    aggregator.quiz_analytics(quiz_id, start_date, end_date).await
}

pub async fn cmd_user_analytics(aggregator: &AnalyticsAggregator, user_id: &str) -> Result<UserAnalytics> {
    aggregator.user_analytics(user_id).await
}

fn print_groups(label: &str, groups: &[GroupStats]) {
    println!("\n{}:", label);
    for g in groups {
        println!(
            "  {}  {}/{} correct ({:.2}%)",
            g.id, g.correct, g.attempts, g.accuracy_pct
        );
    }
}

pub fn print_quiz_analytics(report: &QuizAnalytics) {
    println!("\n📈 Quiz analytics: {}\n", report.quiz_id);
    if report.start_date.is_some() || report.end_date.is_some() {
        println!(
            "Range: {} to {}",
            report.start_date.as_deref().unwrap_or("beginning"),
            report.end_date.as_deref().unwrap_or("now")
        );
    }
    println!("Submissions: {}", report.total_submissions);
    println!("Correct: {}", report.total_correct);
    println!("Accuracy: {:.2}%", report.accuracy_pct);
    print_groups("Per question", &report.per_question);
}

pub fn print_user_analytics(report: &UserAnalytics) {
    println!("\n📈 User analytics: {}\n", report.user_id);
    println!("Quizzes attempted: {}", report.distinct_quizzes_attempted);
    println!("Submissions: {}", report.total_submissions);
    println!("Correct: {}", report.total_correct);
    println!("Accuracy: {:.2}%", report.accuracy_pct);
    print_groups("Per quiz", &report.per_quiz);
}
