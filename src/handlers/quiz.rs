// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        enums::{Category, Difficulty, QuizRole},
        quiz::{CreateQuizRequest, PublicQuiz, Question, QuestionInput, QuizSummary, UpdateQuizRequest},
        quiz_result::SubmitQuizRequest,
    },
    state::AppState,
    store::{HistoryFilter, NewQuiz, QuizFilter, QuizPatch},
    submission,
    utils::{html::clean_text, jwt::Claims},
};

#[derive(Debug, Deserialize)]
pub struct ListQuizzesQuery {
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub game_mode: Option<String>,
    pub role: Option<String>,
    pub limit: Option<i64>,
}

fn sanitize_question(input: QuestionInput) -> Question {
    Question {
        prompt: clean_text(&input.prompt),
        options: input.options.iter().map(|o| clean_text(o)).collect(),
        correct_answer: input.correct_answer,
        explanation: input.explanation.as_deref().map(clean_text),
        points: input.points,
    }
}

/// Lists active quizzes for an audience role, newest first, answers hidden.
pub async fn list_quizzes(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Query(query): Query<ListQuizzesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let role: QuizRole = role.parse().map_err(AppError::BadRequest)?;
    let difficulty = query
        .difficulty
        .map(|d| d.parse::<Difficulty>())
        .transpose()
        .map_err(AppError::BadRequest)?;
    let category = query
        .category
        .map(|c| c.parse::<Category>())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = QuizFilter {
        difficulty,
        category,
        limit: query.limit.unwrap_or(10),
    };
    let quizzes = state.store.quizzes_by_role(role, &filter).await?;
    let summaries: Vec<QuizSummary> = quizzes.iter().map(QuizSummary::from).collect();

    Ok(Json(summaries))
}

/// Returns one active quiz with the correct answers stripped.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state
        .store
        .quiz_by_id(quiz_id)
        .await?
        .filter(|q| q.is_active)
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(PublicQuiz::from(quiz)))
}

/// Submits one quiz attempt for the authenticated caller.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let user_id = claims.user_id()?;

    let outcome = submission::submit_attempt(
        state.store.as_ref(),
        state.config.badge_policy,
        user_id,
        quiz_id,
        &payload,
    )
    .await?;

    Ok(Json(outcome))
}

/// The caller's attempt history, newest first.
pub async fn quiz_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let game_mode = query
        .game_mode
        .map(|m| m.parse())
        .transpose()
        .map_err(AppError::BadRequest)?;
    let role = query
        .role
        .map(|r| r.parse())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = HistoryFilter {
        game_mode,
        role,
        limit: query.limit.unwrap_or(20),
    };
    let history = state.store.results_for_user(user_id, &filter).await?;

    Ok(Json(history))
}

/// Creates a quiz. Manager only; authoring text is sanitized before
/// storage.
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let created_by = claims.user_id()?;

    let new_quiz = NewQuiz {
        title: clean_text(&payload.title),
        description: payload.description.as_deref().map(clean_text),
        role: payload.role,
        difficulty: payload.difficulty.unwrap_or(Difficulty::Intermediate),
        questions: payload.questions.into_iter().map(sanitize_question).collect(),
        time_limit: payload.time_limit.unwrap_or(30),
        passing_score: payload.passing_score.unwrap_or(70),
        tags: payload.tags.unwrap_or_default(),
        category: payload.category.unwrap_or(Category::General),
        created_by,
    };

    let quiz = state.store.insert_quiz(new_quiz).await?;
    tracing::info!(quiz_id = quiz.id, created_by, "quiz created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": quiz.id,
            "title": quiz.title,
            "role": quiz.role,
            "difficulty": quiz.difficulty,
            "question_count": quiz.questions.len(),
        })),
    ))
}

/// Updates a quiz. Manager only. Creator and running statistics cannot be
/// patched through this surface.
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let patch = QuizPatch {
        title: payload.title.as_deref().map(clean_text),
        description: payload.description.as_deref().map(clean_text),
        role: payload.role,
        difficulty: payload.difficulty,
        questions: payload
            .questions
            .map(|qs| qs.into_iter().map(sanitize_question).collect()),
        time_limit: payload.time_limit,
        passing_score: payload.passing_score,
        tags: payload.tags,
        category: payload.category,
        is_active: payload.is_active,
    };

    let quiz = state.store.update_quiz(quiz_id, patch).await?;

    Ok(Json(quiz))
}

/// Soft-deletes a quiz: deactivated, never removed, so recorded attempts
/// keep their reference.
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.store.deactivate_quiz(quiz_id).await?;
    tracing::info!(quiz_id, "quiz deactivated");

    Ok(Json(serde_json::json!({
        "message": "Quiz deactivated"
    })))
}
