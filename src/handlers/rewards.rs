// src/handlers/rewards.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{
    error::AppError,
    models::user::{Badge, Certificate},
    state::AppState,
    utils::jwt::Claims,
};

/// Read-only projection of the caller's reward ledgers.
#[derive(Debug, Serialize)]
pub struct RewardsResponse {
    pub badges: Vec<Badge>,
    pub certificates: Vec<Certificate>,
}

pub async fn list_rewards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    // Both ledgers are append-only; this endpoint never mutates them.
    let badges = state.store.badges_for_user(user_id).await?;
    let certificates = state.store.certificates_for_user(user_id).await?;

    Ok(Json(RewardsResponse {
        badges,
        certificates,
    }))
}
