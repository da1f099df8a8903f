// src/engine/rewards.rs

use crate::config::{CERTIFICATE_MIN_SCORE, HIGH_ACHIEVER_MIN_SCORE, QUIZ_MASTER_MIN_SCORE};
use crate::models::enums::{GameMode, QuizRole};
use crate::models::user::Badge;

/// Certificate eligibility is a pure function of the score at attempt
/// time, independent of game mode, and is never revisited.
pub fn certificate_eligible(score: i64) -> bool {
    score >= CERTIFICATE_MIN_SCORE
}

/// A badge decision before the issuance policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeAward {
    pub name: &'static str,
    pub description: &'static str,
}

pub const QUIZ_MASTER: BadgeAward = BadgeAward {
    name: "Quiz Master",
    description: "Achieved 90% or higher in a contest quiz",
};

pub const HIGH_ACHIEVER: BadgeAward = BadgeAward {
    name: "High Achiever",
    description: "Achieved 85% or higher in a contest quiz",
};

/// Badge decision for one attempt. Contest mode only; the higher tier
/// shadows the lower one.
pub fn badge_for(mode: GameMode, score: i64) -> Option<BadgeAward> {
    if mode != GameMode::Contest {
        return None;
    }
    if score >= QUIZ_MASTER_MIN_SCORE {
        Some(QUIZ_MASTER)
    } else if score >= HIGH_ACHIEVER_MIN_SCORE {
        Some(HIGH_ACHIEVER)
    } else {
        None
    }
}

/// How repeat qualifying attempts are treated. The historical behavior
/// appends a badge every time (an achievement counter); dedupe awards each
/// badge name at most once per user. The state machine is untouched by the
/// choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgePolicy {
    AppendEveryTime,
    DedupeByName,
}

/// Applies the issuance policy against the user's existing ledger.
pub fn apply_policy(
    policy: BadgePolicy,
    existing: &[Badge],
    award: BadgeAward,
) -> Option<BadgeAward> {
    match policy {
        BadgePolicy::AppendEveryTime => Some(award),
        BadgePolicy::DedupeByName => {
            if existing.iter().any(|b| b.name == award.name) {
                None
            } else {
                Some(award)
            }
        }
    }
}

/// Descriptive certificate title: quiz title plus the capitalized quiz
/// role, e.g. "Safety Basics - Student".
pub fn certificate_title(quiz_title: &str, role: QuizRole) -> String {
    format!("{} - {}", quiz_title, role.display_name())
}
