// src/engine/progression.rs

use crate::config::{
    CONTEST_POINTS_PER_PERCENT, PRACTICE_POINTS_PER_PERCENT, PROGRESS_POINTS_PER_PERCENT,
};
use crate::models::enums::GameMode;

/// Raw points for a submission, before any gating. Contest is worth double
/// practice by design.
pub fn points_earned(mode: GameMode, score: i64) -> i64 {
    match mode {
        GameMode::Contest => score * CONTEST_POINTS_PER_PERCENT,
        GameMode::Practice => score * PRACTICE_POINTS_PER_PERCENT,
    }
}

/// Result of applying one submission to a user's training state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionUpdate {
    /// New training progress, 0-100. Never below the input progress.
    pub training_progress: f64,
    /// Latches to true when progress reaches 100; never unlatches.
    pub training_complete: bool,
    /// Leaderboard points to credit. Zero for practice, and zero for a
    /// contest attempt made before training completion (the gate).
    pub points_credited: i64,
}

/// The training-progress state machine: `Training` until progress reaches
/// 100, then `Complete`, terminal.
///
/// Practice submissions advance progress by raw_points / 10 while in
/// training; reaching 100 flips the latch in the same update. Once
/// complete, further practice is a no-op. Contest submissions credit raw
/// points only if the latch was already set at the moment of submission.
pub fn advance(
    mode: GameMode,
    raw_points: i64,
    training_progress: f64,
    training_complete: bool,
) -> ProgressionUpdate {
    match mode {
        GameMode::Practice => {
            if training_complete {
                return ProgressionUpdate {
                    training_progress,
                    training_complete: true,
                    points_credited: 0,
                };
            }
            let mut progress = training_progress + raw_points as f64 / PROGRESS_POINTS_PER_PERCENT;
            let mut complete = false;
            if progress >= 100.0 {
                progress = 100.0;
                complete = true;
            }
            ProgressionUpdate {
                training_progress: progress,
                training_complete: complete,
                points_credited: 0,
            }
        }
        GameMode::Contest => ProgressionUpdate {
            training_progress,
            training_complete,
            points_credited: if training_complete { raw_points } else { 0 },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contest_is_worth_double_practice() {
        assert_eq!(points_earned(GameMode::Contest, 100), 1000);
        assert_eq!(points_earned(GameMode::Practice, 100), 500);
        assert_eq!(points_earned(GameMode::Contest, 92), 920);
        assert_eq!(points_earned(GameMode::Practice, 0), 0);
    }

    #[test]
    fn practice_advances_progress_by_tenth_of_raw_points() {
        let update = advance(GameMode::Practice, 500, 0.0, false);
        assert_eq!(update.training_progress, 50.0);
        assert!(!update.training_complete);
        assert_eq!(update.points_credited, 0);
    }

    #[test]
    fn practice_progress_can_be_fractional() {
        // score 75 practice -> 375 raw -> +37.5.
        let update = advance(GameMode::Practice, 375, 0.0, false);
        assert_eq!(update.training_progress, 37.5);
    }

    #[test]
    fn progress_caps_at_100_and_latches() {
        let update = advance(GameMode::Practice, 500, 90.0, false);
        assert_eq!(update.training_progress, 100.0);
        assert!(update.training_complete);
    }

    #[test]
    fn exactly_reaching_100_latches() {
        let update = advance(GameMode::Practice, 500, 50.0, false);
        assert_eq!(update.training_progress, 100.0);
        assert!(update.training_complete);
    }

    #[test]
    fn practice_after_completion_is_a_noop() {
        let update = advance(GameMode::Practice, 500, 100.0, true);
        assert_eq!(update.training_progress, 100.0);
        assert!(update.training_complete);
        assert_eq!(update.points_credited, 0);
    }

    #[test]
    fn contest_before_completion_credits_nothing() {
        let update = advance(GameMode::Contest, 1000, 40.0, false);
        assert_eq!(update.points_credited, 0);
        assert_eq!(update.training_progress, 40.0);
        assert!(!update.training_complete);
    }

    #[test]
    fn contest_after_completion_credits_raw_points() {
        let update = advance(GameMode::Contest, 920, 100.0, true);
        assert_eq!(update.points_credited, 920);
        assert!(update.training_complete);
    }

    #[test]
    fn progress_never_decreases() {
        let mut progress = 0.0;
        let mut complete = false;
        for raw in [0, 125, 500, 375, 0, 500, 500] {
            let update = advance(GameMode::Practice, raw, progress, complete);
            assert!(update.training_progress >= progress);
            // The latch never reverts.
            assert!(!complete || update.training_complete);
            progress = update.training_progress;
            complete = update.training_complete;
        }
        assert_eq!(progress, 100.0);
        assert!(complete);
    }
}
