// src/handlers/leaderboard.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    engine::rank,
    error::AppError,
    models::{
        quiz_result::{RankResponse, RankedLeaderboardRow, RankedQuizLeaderboardRow},
        user::UserStats,
    },
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Optional account-role filter ('user', 'manager', 'admin').
    pub role: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Global leaderboard: active users by points descending, tie ranks
/// shared via the strict-greater rule.
pub async fn global_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .store
        .top_users_by_points(query.role.as_deref(), query.limit.unwrap_or(10))
        .await?;

    let points: Vec<i64> = rows.iter().map(|r| r.points).collect();
    let ranks = rank::assign_ranks(&points);
    let ranked: Vec<RankedLeaderboardRow> = rows
        .into_iter()
        .zip(ranks)
        .map(|(row, rank)| RankedLeaderboardRow {
            rank,
            user_id: row.user_id,
            username: row.username,
            points: row.points,
        })
        .collect();

    Ok(Json(ranked))
}

/// The caller's rank: one plus the number of active users with strictly
/// more points.
pub async fn user_rank(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let above = state
        .store
        .count_active_with_points_above(user.points)
        .await?;

    Ok(Json(RankResponse {
        rank: rank::rank_from_count(above),
        points: user.points,
    }))
}

/// Contest attempts for one quiz, best score first, faster time breaking
/// score ties in the ordering; equal scores share a rank number.
pub async fn quiz_leaderboard(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .store
        .contest_results_for_quiz(quiz_id, query.limit.unwrap_or(10))
        .await?;

    let scores: Vec<i64> = rows.iter().map(|r| r.score).collect();
    let ranks = rank::assign_ranks(&scores);
    let ranked: Vec<RankedQuizLeaderboardRow> = rows
        .into_iter()
        .zip(ranks)
        .map(|(row, rank)| RankedQuizLeaderboardRow {
            rank,
            user_id: row.user_id,
            username: row.username,
            score: row.score,
            time_spent: row.time_spent,
            completed_at: row.completed_at,
        })
        .collect();

    Ok(Json(ranked))
}

/// The caller's stats roll-up: points, progress, rank, ledger counts.
pub async fn user_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let above = state
        .store
        .count_active_with_points_above(user.points)
        .await?;
    let badges = state.store.badges_for_user(user_id).await?;
    let certificates = state.store.certificates_for_user(user_id).await?;

    Ok(Json(UserStats {
        points: user.points,
        training_progress: user.training_progress,
        training_complete: user.training_complete,
        rank: rank::rank_from_count(above),
        badges: badges.len(),
        certificates: certificates.len(),
    }))
}
