// src/models/user.rs

use serde::Serialize;
use sqlx::FromRow;

/// The progression-relevant slice of a user account. Identity issuance is
/// handled by an external service; this backend only reads and mutates the
/// gamification fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    pub username: String,

    /// Account role: 'user', 'manager' or 'admin'. Distinct from the quiz
    /// audience role.
    pub role: String,

    /// Leaderboard points. Non-decreasing through the engine; only an
    /// administrative override may lower it.
    pub points: i64,

    /// 0-100. Non-decreasing; fractional values occur because practice
    /// points divide by ten.
    pub training_progress: f64,

    /// One-way latch; gates contest point accrual.
    pub training_complete: bool,

    /// Deactivated users are excluded from rank and leaderboard queries.
    pub is_active: bool,

    /// Optimistic-concurrency stamp for the read-modify-write cycle in the
    /// submission flow. Never serialized to clients.
    #[serde(skip)]
    pub version: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Badge ledger entry. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub name: String,
    pub description: String,
    pub earned_at: chrono::DateTime<chrono::Utc>,
}

/// Certificate ledger entry. Append-only; the title and score are decided
/// once at attempt time, document rendering is external.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Certificate {
    pub title: String,
    pub score: i64,
    pub issued_at: chrono::DateTime<chrono::Utc>,
}

/// User projection returned from the submission endpoint.
#[derive(Debug, Serialize)]
pub struct UserSnapshot {
    pub id: i64,
    pub username: String,
    pub points: i64,
    pub training_progress: f64,
    pub training_complete: bool,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        UserSnapshot {
            id: user.id,
            username: user.username.clone(),
            points: user.points,
            training_progress: user.training_progress,
            training_complete: user.training_complete,
        }
    }
}

/// Caller-facing stats roll-up (rank, ledger counts).
#[derive(Debug, Serialize)]
pub struct UserStats {
    pub points: i64,
    pub training_progress: f64,
    pub training_complete: bool,
    pub rank: i64,
    pub badges: usize,
    pub certificates: usize,
}
