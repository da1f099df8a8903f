// src/submission.rs
//
// The submission orchestrator: one quiz attempt in, a scored result, a
// progression update and zero or more rewards out. The step order matters;
// later steps read state written by earlier ones.

use crate::config::MAX_USER_WRITE_ATTEMPTS;
use crate::engine::{progression, rewards, score};
use crate::error::AppError;
use crate::models::enums::GameMode;
use crate::models::quiz_result::{AnswerRecord, SubmitQuizRequest, SubmitQuizResponse};
use crate::models::user::UserSnapshot;
use crate::store::{NewBadge, NewCertificate, NewQuizResult, Store, StoreError, UserProgressUpdate};

/// Processes one quiz attempt end to end:
///
/// 1. load the quiz (missing or deactivated -> 404, nothing recorded);
/// 2. normalize and score the answers, decide passed;
/// 3. compute the raw mode-dependent points;
/// 4. append the attempt to the result ledger;
/// 5. read the user fresh and apply the gated progression transition plus
///    reward appends in one version-checked write, retrying on conflict;
/// 6. fold the score into the quiz's running statistics;
/// 7. return the composed outcome with an updated user snapshot.
pub async fn submit_attempt(
    store: &dyn Store,
    badge_policy: rewards::BadgePolicy,
    user_id: i64,
    quiz_id: i64,
    req: &SubmitQuizRequest,
) -> Result<SubmitQuizResponse, AppError> {
    let quiz = store
        .quiz_by_id(quiz_id)
        .await?
        .filter(|q| q.is_active)
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let answers = score::normalize_answers(&req.answers, quiz.questions.len());
    let breakdown = score::score_answers(&quiz.questions, &answers);
    let passed = breakdown.score >= quiz.passing_score;
    let raw_points = progression::points_earned(req.game_mode, breakdown.score);
    let certificate_eligible = rewards::certificate_eligible(breakdown.score);

    let per_question_time = if answers.is_empty() {
        0
    } else {
        (req.time_spent as f64 / answers.len() as f64).round() as i64
    };
    let answer_log: Vec<AnswerRecord> = answers
        .iter()
        .enumerate()
        .map(|(index, selected)| AnswerRecord {
            question_index: index as i64,
            selected_answer: *selected,
            is_correct: quiz.questions[index].correct_answer == *selected,
            time_spent: per_question_time,
        })
        .collect();

    // The ledger entry carries the raw points even when the contest gate
    // later suppresses crediting; the two figures are allowed to diverge.
    let result = store
        .insert_result(NewQuizResult {
            user_id,
            quiz_id: quiz.id,
            score: breakdown.score,
            points_earned: raw_points,
            answers: answer_log,
            game_mode: req.game_mode,
            role: req.role,
            time_spent: req.time_spent,
            passed,
            certificate_eligible,
        })
        .await?;

    // Read-modify-write over the user aggregate, guarded by its version.
    let mut attempts_left = MAX_USER_WRITE_ATTEMPTS;
    let (user, credited) = loop {
        let user = store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let update = progression::advance(
            req.game_mode,
            raw_points,
            user.training_progress,
            user.training_complete,
        );

        let badge = match rewards::badge_for(req.game_mode, breakdown.score) {
            Some(award) => {
                let existing = store.badges_for_user(user_id).await?;
                rewards::apply_policy(badge_policy, &existing, award)
            }
            None => None,
        };

        let certificate = certificate_eligible.then(|| NewCertificate {
            title: rewards::certificate_title(&quiz.title, req.role),
            score: breakdown.score,
        });

        match store
            .apply_user_update(UserProgressUpdate {
                user_id,
                expected_version: user.version,
                training_progress: update.training_progress,
                training_complete: update.training_complete,
                points_delta: update.points_credited,
                badge: badge.map(|b| NewBadge {
                    name: b.name.to_string(),
                    description: b.description.to_string(),
                }),
                certificate,
                result_id: result.id,
            })
            .await
        {
            Ok(updated) => break (updated, update.points_credited),
            Err(StoreError::VersionConflict) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    tracing::warn!(
                        user_id,
                        quiz_id,
                        "user aggregate kept moving, giving up after {} attempts",
                        MAX_USER_WRITE_ATTEMPTS
                    );
                    return Err(AppError::Conflict(
                        "Profile was updated concurrently, please retry".to_string(),
                    ));
                }
            }
            Err(e) => return Err(e.into()),
        }
    };

    store.record_quiz_attempt(quiz.id, breakdown.score).await?;

    // Effective points: practice reports the raw figure, contest reports
    // what was actually credited (zero while training is incomplete).
    let points_earned = match req.game_mode {
        GameMode::Practice => raw_points,
        GameMode::Contest => credited,
    };

    Ok(SubmitQuizResponse {
        score: breakdown.score,
        passed,
        points_earned,
        certificate_eligible,
        correct_answers: breakdown.correct_points,
        total_questions: quiz.questions.len(),
        time_spent_minutes: (req.time_spent as f64 / 60.0).round() as i64,
        user: UserSnapshot::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rewards::BadgePolicy;
    use crate::models::enums::{Category, Difficulty, QuizRole};
    use crate::models::quiz::Question;
    use crate::store::memory::{MemoryStore, SeedUser};
    use crate::store::{NewQuiz, QuizFilter};

    fn three_question_quiz() -> NewQuiz {
        let questions = (0..3)
            .map(|i| Question {
                prompt: format!("question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: 1,
                explanation: None,
                points: 10,
            })
            .collect();
        NewQuiz {
            title: "Onboarding Basics".to_string(),
            description: None,
            role: QuizRole::Student,
            difficulty: Difficulty::Beginner,
            questions,
            time_limit: 30,
            passing_score: 70,
            tags: vec![],
            category: Category::General,
            created_by: 1,
        }
    }

    fn request(mode: GameMode, answers: Vec<i64>) -> SubmitQuizRequest {
        SubmitQuizRequest {
            answers,
            game_mode: mode,
            role: QuizRole::Student,
            time_spent: 120,
        }
    }

    async fn setup(complete: bool) -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new();
        let user = store.seed_user(SeedUser {
            username: "dana".to_string(),
            training_progress: if complete { 100.0 } else { 0.0 },
            training_complete: complete,
            ..SeedUser::default()
        });
        let quiz = store.insert_quiz(three_question_quiz()).await.unwrap();
        (store, user.id, quiz.id)
    }

    #[tokio::test]
    async fn perfect_practice_run_advances_progress() {
        let (store, user_id, quiz_id) = setup(false).await;

        let out = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap();

        assert_eq!(out.score, 100);
        assert!(out.passed);
        assert_eq!(out.points_earned, 500);
        assert_eq!(out.correct_answers, 30);
        assert_eq!(out.total_questions, 3);
        assert_eq!(out.time_spent_minutes, 2);
        assert_eq!(out.user.training_progress, 50.0);
        assert!(!out.user.training_complete);
        // Practice never touches leaderboard points.
        assert_eq!(out.user.points, 0);
    }

    #[tokio::test]
    async fn contest_before_training_complete_is_gated() {
        let (store, user_id, quiz_id) = setup(false).await;

        let out = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Contest, vec![1, 1, 1]),
        )
        .await
        .unwrap();

        assert_eq!(out.score, 100);
        assert_eq!(out.points_earned, 0);
        assert_eq!(out.user.points, 0);

        // The ledger still records the raw figure for audit.
        let history = store
            .results_for_user(
                user_id,
                &crate::store::HistoryFilter {
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].points_earned, 1000);
    }

    #[tokio::test]
    async fn contest_after_training_complete_credits_and_rewards() {
        let (store, user_id, quiz_id) = setup(true).await;

        let out = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Contest, vec![1, 1, 1]),
        )
        .await
        .unwrap();

        assert_eq!(out.points_earned, 1000);
        assert!(out.certificate_eligible);
        assert_eq!(out.user.points, 1000);

        let badges = store.badges_for_user(user_id).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].name, "Quiz Master");

        let certificates = store.certificates_for_user(user_id).await.unwrap();
        assert_eq!(certificates.len(), 1);
        assert_eq!(certificates[0].title, "Onboarding Basics - Student");
        assert_eq!(certificates[0].score, 100);
    }

    #[tokio::test]
    async fn repeat_contest_wins_duplicate_badges_under_append_policy() {
        let (store, user_id, quiz_id) = setup(true).await;

        for _ in 0..3 {
            submit_attempt(
                &store,
                BadgePolicy::AppendEveryTime,
                user_id,
                quiz_id,
                &request(GameMode::Contest, vec![1, 1, 1]),
            )
            .await
            .unwrap();
        }

        assert_eq!(store.badges_for_user(user_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dedupe_policy_awards_each_badge_once() {
        let (store, user_id, quiz_id) = setup(true).await;

        for _ in 0..3 {
            submit_attempt(
                &store,
                BadgePolicy::DedupeByName,
                user_id,
                quiz_id,
                &request(GameMode::Contest, vec![1, 1, 1]),
            )
            .await
            .unwrap();
        }

        assert_eq!(store.badges_for_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn short_answer_sheet_is_padded_before_scoring() {
        let (store, user_id, quiz_id) = setup(false).await;

        let padded = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1]),
        )
        .await
        .unwrap();

        let explicit = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 0, 0]),
        )
        .await
        .unwrap();

        assert_eq!(padded.score, explicit.score);
        assert_eq!(padded.score, 33);
    }

    #[tokio::test]
    async fn inactive_quiz_is_not_found_and_records_nothing() {
        let (store, user_id, quiz_id) = setup(false).await;
        store.deactivate_quiz(quiz_id).await.unwrap();

        let err = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let history = store
            .results_for_user(
                user_id,
                &crate::store::HistoryFilter {
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn version_conflict_is_retried() {
        let (store, user_id, quiz_id) = setup(false).await;
        store.inject_version_conflicts(MAX_USER_WRITE_ATTEMPTS - 1);

        let out = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap();

        assert_eq!(out.user.training_progress, 50.0);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_conflict() {
        let (store, user_id, quiz_id) = setup(false).await;
        store.inject_version_conflicts(MAX_USER_WRITE_ATTEMPTS);

        let err = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn quiz_statistics_track_the_incremental_average() {
        let (store, user_id, quiz_id) = setup(false).await;

        // 100, then 33: average should land on 66.5.
        submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap();
        submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 0, 0]),
        )
        .await
        .unwrap();

        let quiz = store.quiz_by_id(quiz_id).await.unwrap().unwrap();
        assert_eq!(quiz.attempts, 2);
        assert!((quiz.average_score - 66.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn practice_to_completion_unlocks_contest_points() {
        let (store, user_id, quiz_id) = setup(false).await;

        // Two perfect practice runs: 50% each, latch at 100.
        for _ in 0..2 {
            submit_attempt(
                &store,
                BadgePolicy::AppendEveryTime,
                user_id,
                quiz_id,
                &request(GameMode::Practice, vec![1, 1, 1]),
            )
            .await
            .unwrap();
        }
        let user = store.user_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.training_progress, 100.0);
        assert!(user.training_complete);

        let out = submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Contest, vec![1, 1, 1]),
        )
        .await
        .unwrap();
        assert_eq!(out.points_earned, 1000);
        assert_eq!(out.user.points, 1000);
    }

    #[tokio::test]
    async fn deactivated_quiz_results_survive() {
        let (store, user_id, quiz_id) = setup(false).await;

        submit_attempt(
            &store,
            BadgePolicy::AppendEveryTime,
            user_id,
            quiz_id,
            &request(GameMode::Practice, vec![1, 1, 1]),
        )
        .await
        .unwrap();
        store.deactivate_quiz(quiz_id).await.unwrap();

        let history = store
            .results_for_user(
                user_id,
                &crate::store::HistoryFilter {
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quiz_id, quiz_id);
    }

    #[tokio::test]
    async fn listing_hides_deactivated_quizzes() {
        let (store, _user_id, quiz_id) = setup(false).await;
        store.deactivate_quiz(quiz_id).await.unwrap();

        let listed = store
            .quizzes_by_role(
                QuizRole::Student,
                &QuizFilter {
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
