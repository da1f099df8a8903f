// src/store/mod.rs

use async_trait::async_trait;
use std::fmt;

use crate::models::enums::{Category, Difficulty, GameMode, QuizRole};
use crate::models::quiz::{Question, Quiz};
use crate::models::quiz_result::{
    AnswerRecord, LeaderboardRow, QuizLeaderboardRow, QuizResult,
};
use crate::models::user::{Badge, Certificate, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage-level failures. `VersionConflict` is the optimistic-concurrency
/// signal the submission flow retries on.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    VersionConflict,
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::VersionConflict => write!(f, "version conflict"),
            StoreError::Backend(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Payload for creating a quiz.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub role: QuizRole,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    pub time_limit: i64,
    pub passing_score: i64,
    pub tags: Vec<String>,
    pub category: Category,
    pub created_by: i64,
}

/// Partial quiz update; `None` leaves a field untouched. Creator and
/// running statistics are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct QuizPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub role: Option<QuizRole>,
    pub difficulty: Option<Difficulty>,
    pub questions: Option<Vec<Question>>,
    pub time_limit: Option<i64>,
    pub passing_score: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    pub is_active: Option<bool>,
}

/// Listing filters for quiz catalogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizFilter {
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
    pub limit: i64,
}

/// Filters for a user's attempt history.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub game_mode: Option<GameMode>,
    pub role: Option<QuizRole>,
    pub limit: i64,
}

/// Payload for the append-only result ledger.
#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub points_earned: i64,
    pub answers: Vec<AnswerRecord>,
    pub game_mode: GameMode,
    pub role: QuizRole,
    pub time_spent: i64,
    pub passed: bool,
    pub certificate_eligible: bool,
}

/// Badge to append along with a user update.
#[derive(Debug, Clone)]
pub struct NewBadge {
    pub name: String,
    pub description: String,
}

/// Certificate descriptor to append along with a user update.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub title: String,
    pub score: i64,
}

/// One version-checked write against the user aggregate: progression
/// fields plus any reward appends, applied together or not at all. The
/// appends are keyed by `result_id` so a retried write never double-awards.
#[derive(Debug, Clone)]
pub struct UserProgressUpdate {
    pub user_id: i64,
    /// Version observed by the preceding read; the write fails with
    /// `VersionConflict` if the row has moved on.
    pub expected_version: i64,
    pub training_progress: f64,
    pub training_complete: bool,
    /// Leaderboard increment; zero for practice or gated contest attempts.
    pub points_delta: i64,
    pub badge: Option<NewBadge>,
    pub certificate: Option<NewCertificate>,
    pub result_id: i64,
}

/// The narrow persistence boundary the engine talks through. `PgStore`
/// backs production; `MemoryStore` backs tests and local development.
#[async_trait]
pub trait Store: Send + Sync {
    async fn quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>, StoreError>;

    /// Active quizzes for an audience role, newest first.
    async fn quizzes_by_role(
        &self,
        role: QuizRole,
        filter: &QuizFilter,
    ) -> Result<Vec<Quiz>, StoreError>;

    async fn insert_quiz(&self, new: NewQuiz) -> Result<Quiz, StoreError>;

    async fn update_quiz(&self, quiz_id: i64, patch: QuizPatch) -> Result<Quiz, StoreError>;

    /// Soft delete; attempt records survive.
    async fn deactivate_quiz(&self, quiz_id: i64) -> Result<(), StoreError>;

    /// Atomically folds one attempt into the quiz's running statistics:
    /// attempts += 1, average = (average * old_attempts + score) / attempts.
    async fn record_quiz_attempt(&self, quiz_id: i64, score: i64) -> Result<(), StoreError>;

    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    /// Compare-and-swap write of the progression slice plus reward appends.
    async fn apply_user_update(&self, update: UserProgressUpdate) -> Result<User, StoreError>;

    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, StoreError>;

    async fn certificates_for_user(&self, user_id: i64) -> Result<Vec<Certificate>, StoreError>;

    async fn insert_result(&self, new: NewQuizResult) -> Result<QuizResult, StoreError>;

    /// Caller's attempts, completion time descending.
    async fn results_for_user(
        &self,
        user_id: i64,
        filter: &HistoryFilter,
    ) -> Result<Vec<QuizResult>, StoreError>;

    /// Contest attempts for one quiz, score descending then time ascending.
    async fn contest_results_for_quiz(
        &self,
        quiz_id: i64,
        limit: i64,
    ) -> Result<Vec<QuizLeaderboardRow>, StoreError>;

    /// Active users holding strictly more points than the given total.
    async fn count_active_with_points_above(&self, points: i64) -> Result<i64, StoreError>;

    /// Active users by points descending, optionally filtered by account
    /// role.
    async fn top_users_by_points(
        &self,
        role: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, StoreError>;
}
