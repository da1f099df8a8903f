// src/models/quiz_result.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::enums::{GameMode, QuizRole};
use crate::models::user::UserSnapshot;

/// Per-question entry of a result's answer log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: i64,
    pub selected_answer: i64,
    pub is_correct: bool,
    /// Seconds, distributed evenly across the attempt's questions.
    pub time_spent: i64,
}

/// Immutable record of one quiz attempt. Append-only ledger: created once
/// per submission, never mutated, survives quiz deactivation.
#[derive(Debug, Clone, Serialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    /// 0-100.
    pub score: i64,
    /// Raw figure from the mode formula. For a gated contest attempt this
    /// stays on record for audit even though nothing was credited.
    pub points_earned: i64,
    pub answers: Vec<AnswerRecord>,
    pub game_mode: GameMode,
    pub role: QuizRole,
    /// Seconds.
    pub time_spent: i64,
    pub passed: bool,
    /// Decided once from the score at creation, never recomputed.
    pub certificate_eligible: bool,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// Selected option index per question, aligned with the quiz's
    /// question order. Length mismatches are normalized, not rejected.
    pub answers: Vec<i64>,
    pub game_mode: GameMode,
    pub role: QuizRole,
    /// Seconds.
    #[validate(range(min = 0, max = 86400))]
    pub time_spent: i64,
}

/// Response for a submitted attempt.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub score: i64,
    pub passed: bool,
    /// Effective points: raw for practice, gated (possibly 0) for contest.
    pub points_earned: i64,
    pub certificate_eligible: bool,
    /// Points credited by correctly answered questions.
    pub correct_answers: i64,
    pub total_questions: usize,
    pub time_spent_minutes: i64,
    pub user: UserSnapshot,
}

/// Global leaderboard projection over active users.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: i64,
    pub username: String,
    pub points: i64,
    pub training_progress: f64,
}

#[derive(Debug, Serialize)]
pub struct RankedLeaderboardRow {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub points: i64,
}

/// One contest attempt in a quiz-specific leaderboard, ordered score
/// descending then elapsed time ascending.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QuizLeaderboardRow {
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub time_spent: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RankedQuizLeaderboardRow {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub time_spent: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub rank: i64,
    pub points: i64,
}
