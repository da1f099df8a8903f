// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{leaderboard, quiz, rewards},
    state::AppState,
    utils::jwt::{auth_middleware, manager_middleware},
};

/// Assembles the main application router.
///
/// * Public catalog and leaderboard reads under /api/quizzes and
///   /api/leaderboard.
/// * JWT-protected submission, history, rank and reward routes.
/// * Manager-protected quiz authoring under /api/manage.
/// * Global middleware (Trace, CORS) and rate limiting on submissions.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Submission burst control; keyed on peer IP, so the server must be
    // started with connect info (see main.rs).
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(50)
            .finish()
            .unwrap(),
    );

    let quiz_routes = Router::new()
        .route("/role/{role}", get(quiz::list_quizzes))
        .route("/{id}", get(quiz::get_quiz))
        .merge(
            Router::new()
                .route(
                    "/{id}/submit",
                    post(quiz::submit_quiz).layer(GovernorLayer::new(governor_conf)),
                )
                .route("/history", get(quiz::quiz_history))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let manage_routes = Router::new()
        .route("/quizzes", post(quiz::create_quiz))
        .route(
            "/quizzes/{id}",
            put(quiz::update_quiz).delete(quiz::delete_quiz),
        )
        // Double middleware protection: Auth first, then role check.
        .layer(middleware::from_fn(manager_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let leaderboard_routes = Router::new()
        .route("/", get(leaderboard::global_leaderboard))
        .route("/quiz/{id}", get(leaderboard::quiz_leaderboard))
        .merge(
            Router::new()
                .route("/rank", get(leaderboard::user_rank))
                .route("/stats", get(leaderboard::user_stats))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let reward_routes = Router::new()
        .route("/", get(rewards::list_rewards))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/manage", manage_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/rewards", reward_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
