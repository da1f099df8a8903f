// src/store/memory.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::models::enums::GameMode;
use crate::models::quiz::Quiz;
use crate::models::quiz_result::{LeaderboardRow, QuizLeaderboardRow, QuizResult};
use crate::models::user::{Badge, Certificate, User};
use crate::store::{
    HistoryFilter, NewQuiz, NewQuizResult, QuizFilter, QuizPatch, Store, StoreError,
    UserProgressUpdate,
};

#[derive(Debug, Clone)]
struct StoredBadge {
    user_id: i64,
    result_id: i64,
    badge: Badge,
}

#[derive(Debug, Clone)]
struct StoredCertificate {
    user_id: i64,
    result_id: i64,
    certificate: Certificate,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    quizzes: HashMap<i64, Quiz>,
    results: Vec<QuizResult>,
    badges: Vec<StoredBadge>,
    certificates: Vec<StoredCertificate>,
    next_user_id: i64,
    next_quiz_id: i64,
    next_result_id: i64,
}

/// Seed payload for test and local-development users. Identity fields
/// only; in production these rows are owned by the identity service.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub role: String,
    pub points: i64,
    pub training_progress: f64,
    pub training_complete: bool,
    pub is_active: bool,
}

impl Default for SeedUser {
    fn default() -> Self {
        SeedUser {
            username: "user".to_string(),
            role: "user".to_string(),
            points: 0,
            training_progress: 0.0,
            training_complete: false,
            is_active: true,
        }
    }
}

/// In-memory `Store` with the same semantics as `PgStore`, including the
/// version-checked user write and the result-id dedupe on reward appends.
/// Backs the integration tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    forced_conflicts: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    /// Makes the next `n` calls to `apply_user_update` fail with
    /// `VersionConflict`, for exercising the submission retry loop.
    pub fn inject_version_conflicts(&self, n: u32) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn seed_user(&self, seed: SeedUser) -> User {
        let mut inner = self.inner.lock().expect("memory store lock poisoned");
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: seed.username,
            role: seed.role,
            points: seed.points,
            training_progress: seed.training_progress,
            training_complete: seed.training_complete,
            is_active: seed.is_active,
            version: 0,
            created_at: chrono::Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.quizzes.get(&quiz_id).cloned())
    }

    async fn quizzes_by_role(
        &self,
        role: crate::models::enums::QuizRole,
        filter: &QuizFilter,
    ) -> Result<Vec<Quiz>, StoreError> {
        let inner = self.lock()?;
        let mut quizzes: Vec<Quiz> = inner
            .quizzes
            .values()
            .filter(|q| q.is_active && q.role == role)
            .filter(|q| filter.difficulty.is_none_or(|d| q.difficulty == d))
            .filter(|q| filter.category.is_none_or(|c| q.category == c))
            .cloned()
            .collect();
        // Newest first; ids are monotone.
        quizzes.sort_by(|a, b| b.id.cmp(&a.id));
        quizzes.truncate(filter.limit.max(0) as usize);
        Ok(quizzes)
    }

    async fn insert_quiz(&self, new: NewQuiz) -> Result<Quiz, StoreError> {
        let mut inner = self.lock()?;
        inner.next_quiz_id += 1;
        let quiz = Quiz {
            id: inner.next_quiz_id,
            title: new.title,
            description: new.description,
            role: new.role,
            difficulty: new.difficulty,
            questions: new.questions,
            time_limit: new.time_limit,
            passing_score: new.passing_score,
            is_active: true,
            tags: new.tags,
            category: new.category,
            created_by: new.created_by,
            attempts: 0,
            average_score: 0.0,
            created_at: chrono::Utc::now(),
        };
        inner.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn update_quiz(&self, quiz_id: i64, patch: QuizPatch) -> Result<Quiz, StoreError> {
        let mut inner = self.lock()?;
        let quiz = inner.quizzes.get_mut(&quiz_id).ok_or(StoreError::NotFound)?;
        if let Some(title) = patch.title {
            quiz.title = title;
        }
        if let Some(description) = patch.description {
            quiz.description = Some(description);
        }
        if let Some(role) = patch.role {
            quiz.role = role;
        }
        if let Some(difficulty) = patch.difficulty {
            quiz.difficulty = difficulty;
        }
        if let Some(questions) = patch.questions {
            quiz.questions = questions;
        }
        if let Some(time_limit) = patch.time_limit {
            quiz.time_limit = time_limit;
        }
        if let Some(passing_score) = patch.passing_score {
            quiz.passing_score = passing_score;
        }
        if let Some(tags) = patch.tags {
            quiz.tags = tags;
        }
        if let Some(category) = patch.category {
            quiz.category = category;
        }
        if let Some(is_active) = patch.is_active {
            quiz.is_active = is_active;
        }
        Ok(quiz.clone())
    }

    async fn deactivate_quiz(&self, quiz_id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let quiz = inner.quizzes.get_mut(&quiz_id).ok_or(StoreError::NotFound)?;
        quiz.is_active = false;
        Ok(())
    }

    async fn record_quiz_attempt(&self, quiz_id: i64, score: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let quiz = inner.quizzes.get_mut(&quiz_id).ok_or(StoreError::NotFound)?;
        let old_attempts = quiz.attempts;
        quiz.attempts += 1;
        quiz.average_score =
            (quiz.average_score * old_attempts as f64 + score as f64) / quiz.attempts as f64;
        Ok(())
    }

    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn apply_user_update(&self, update: UserProgressUpdate) -> Result<User, StoreError> {
        if self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::VersionConflict);
        }

        let mut inner = self.lock()?;
        let user = inner
            .users
            .get_mut(&update.user_id)
            .ok_or(StoreError::NotFound)?;
        if user.version != update.expected_version {
            return Err(StoreError::VersionConflict);
        }

        user.training_progress = update.training_progress;
        user.training_complete = update.training_complete;
        user.points += update.points_delta;
        user.version += 1;
        let updated = user.clone();

        if let Some(badge) = update.badge {
            let already = inner
                .badges
                .iter()
                .any(|b| b.result_id == update.result_id);
            if !already {
                inner.badges.push(StoredBadge {
                    user_id: update.user_id,
                    result_id: update.result_id,
                    badge: Badge {
                        name: badge.name,
                        description: badge.description,
                        earned_at: chrono::Utc::now(),
                    },
                });
            }
        }

        if let Some(certificate) = update.certificate {
            let already = inner
                .certificates
                .iter()
                .any(|c| c.result_id == update.result_id);
            if !already {
                inner.certificates.push(StoredCertificate {
                    user_id: update.user_id,
                    result_id: update.result_id,
                    certificate: Certificate {
                        title: certificate.title,
                        score: certificate.score,
                        issued_at: chrono::Utc::now(),
                    },
                });
            }
        }

        Ok(updated)
    }

    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.badge.clone())
            .collect())
    }

    async fn certificates_for_user(&self, user_id: i64) -> Result<Vec<Certificate>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .certificates
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.certificate.clone())
            .collect())
    }

    async fn insert_result(&self, new: NewQuizResult) -> Result<QuizResult, StoreError> {
        let mut inner = self.lock()?;
        inner.next_result_id += 1;
        let result = QuizResult {
            id: inner.next_result_id,
            user_id: new.user_id,
            quiz_id: new.quiz_id,
            score: new.score,
            points_earned: new.points_earned,
            answers: new.answers,
            game_mode: new.game_mode,
            role: new.role,
            time_spent: new.time_spent,
            passed: new.passed,
            certificate_eligible: new.certificate_eligible,
            completed_at: chrono::Utc::now(),
        };
        inner.results.push(result.clone());
        Ok(result)
    }

    async fn results_for_user(
        &self,
        user_id: i64,
        filter: &HistoryFilter,
    ) -> Result<Vec<QuizResult>, StoreError> {
        let inner = self.lock()?;
        let mut results: Vec<QuizResult> = inner
            .results
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| filter.game_mode.is_none_or(|m| r.game_mode == m))
            .filter(|r| filter.role.is_none_or(|role| r.role == role))
            .cloned()
            .collect();
        // Completion descending; ids break same-instant ties.
        results.sort_by(|a, b| (b.completed_at, b.id).cmp(&(a.completed_at, a.id)));
        results.truncate(filter.limit.max(0) as usize);
        Ok(results)
    }

    async fn contest_results_for_quiz(
        &self,
        quiz_id: i64,
        limit: i64,
    ) -> Result<Vec<QuizLeaderboardRow>, StoreError> {
        let inner = self.lock()?;
        let mut rows: Vec<QuizLeaderboardRow> = inner
            .results
            .iter()
            .filter(|r| r.quiz_id == quiz_id && r.game_mode == GameMode::Contest)
            .filter_map(|r| {
                let user = inner.users.get(&r.user_id).filter(|u| u.is_active)?;
                Some(QuizLeaderboardRow {
                    user_id: r.user_id,
                    username: user.username.clone(),
                    score: r.score,
                    time_spent: r.time_spent,
                    completed_at: r.completed_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.time_spent.cmp(&b.time_spent)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_active_with_points_above(&self, points: i64) -> Result<i64, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .users
            .values()
            .filter(|u| u.is_active && u.points > points)
            .count() as i64)
    }

    async fn top_users_by_points(
        &self,
        role: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, StoreError> {
        let inner = self.lock()?;
        let mut rows: Vec<LeaderboardRow> = inner
            .users
            .values()
            .filter(|u| u.is_active)
            .filter(|u| role.is_none_or(|r| u.role == r))
            .map(|u| LeaderboardRow {
                user_id: u.id,
                username: u.username.clone(),
                points: u.points,
                training_progress: u.training_progress,
            })
            .collect();
        rows.sort_by(|a, b| b.points.cmp(&a.points).then(a.user_id.cmp(&b.user_id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
