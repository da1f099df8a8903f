// src/config.rs

use dotenvy::dotenv;
use std::env;

use crate::engine::rewards::BadgePolicy;

/// Raw points awarded per score percentage point in contest mode.
pub const CONTEST_POINTS_PER_PERCENT: i64 = 10;

/// Raw points awarded per score percentage point in practice mode.
/// Contest is intentionally worth double.
pub const PRACTICE_POINTS_PER_PERCENT: i64 = 5;

/// Ten raw practice points advance training progress by one percentage point.
pub const PROGRESS_POINTS_PER_PERCENT: f64 = 10.0;

/// Minimum score (0-100) for certificate eligibility, any game mode.
pub const CERTIFICATE_MIN_SCORE: i64 = 85;

/// Contest-only badge thresholds.
pub const QUIZ_MASTER_MIN_SCORE: i64 = 90;
pub const HIGH_ACHIEVER_MIN_SCORE: i64 = 85;

/// Upper bound on optimistic-concurrency attempts for the user aggregate
/// write during submission. Exhaustion surfaces as a 409.
pub const MAX_USER_WRITE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub badge_policy: BadgePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        // "append" keeps the historical behavior (a badge per qualifying
        // attempt); "dedupe" awards each badge name at most once.
        let badge_policy = match env::var("BADGE_POLICY").as_deref() {
            Ok("dedupe") => BadgePolicy::DedupeByName,
            _ => BadgePolicy::AppendEveryTime,
        };

        Self {
            database_url,
            jwt_secret,
            rust_log,
            badge_policy,
        }
    }
}
