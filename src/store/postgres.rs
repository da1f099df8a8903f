// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::models::enums::QuizRole;
use crate::models::quiz::{Question, Quiz};
use crate::models::quiz_result::{
    AnswerRecord, LeaderboardRow, QuizLeaderboardRow, QuizResult,
};
use crate::models::user::{Badge, Certificate, User};
use crate::store::{
    HistoryFilter, NewQuiz, NewQuizResult, QuizFilter, QuizPatch, Store, StoreError,
    UserProgressUpdate,
};

const QUIZ_COLUMNS: &str = "id, title, description, role, difficulty, questions, time_limit, \
     passing_score, is_active, tags, category, created_by, attempts, average_score, created_at";

const RESULT_COLUMNS: &str = "id, user_id, quiz_id, score, points_earned, answers, game_mode, \
     role, time_spent, passed, certificate_eligible, completed_at";

const USER_COLUMNS: &str = "id, username, role, points, training_progress, training_complete, \
     is_active, version, created_at";

/// Raw quizzes row; enum columns come back as TEXT and are parsed into the
/// closed types on conversion.
#[derive(FromRow)]
struct QuizRow {
    id: i64,
    title: String,
    description: Option<String>,
    role: String,
    difficulty: String,
    questions: Json<Vec<Question>>,
    time_limit: i64,
    passing_score: i64,
    is_active: bool,
    tags: Json<Vec<String>>,
    category: String,
    created_by: i64,
    attempts: i64,
    average_score: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = StoreError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: row.id,
            title: row.title,
            description: row.description,
            role: row.role.parse().map_err(StoreError::Backend)?,
            difficulty: row.difficulty.parse().map_err(StoreError::Backend)?,
            questions: row.questions.0,
            time_limit: row.time_limit,
            passing_score: row.passing_score,
            is_active: row.is_active,
            tags: row.tags.0,
            category: row.category.parse().map_err(StoreError::Backend)?,
            created_by: row.created_by,
            attempts: row.attempts,
            average_score: row.average_score,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ResultRow {
    id: i64,
    user_id: i64,
    quiz_id: i64,
    score: i64,
    points_earned: i64,
    answers: Json<Vec<AnswerRecord>>,
    game_mode: String,
    role: String,
    time_spent: i64,
    passed: bool,
    certificate_eligible: bool,
    completed_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ResultRow> for QuizResult {
    type Error = StoreError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        Ok(QuizResult {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            score: row.score,
            points_earned: row.points_earned,
            answers: row.answers.0,
            game_mode: row.game_mode.parse().map_err(StoreError::Backend)?,
            role: row.role.parse().map_err(StoreError::Backend)?,
            time_spent: row.time_spent,
            passed: row.passed,
            certificate_eligible: row.certificate_eligible,
            completed_at: row.completed_at,
        })
    }
}

/// Postgres-backed store. Uses the runtime query API; the user aggregate
/// write is a version-checked compare-and-swap, quiz statistics fold in a
/// single atomic UPDATE, and reward appends are idempotent on result_id.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>, StoreError> {
        let row: Option<QuizRow> =
            sqlx::query_as(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
                .bind(quiz_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Quiz::try_from).transpose()
    }

    async fn quizzes_by_role(
        &self,
        role: QuizRole,
        filter: &QuizFilter,
    ) -> Result<Vec<Quiz>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE is_active = TRUE AND role = "
        ));
        builder.push_bind(role.as_str());
        if let Some(difficulty) = filter.difficulty {
            builder.push(" AND difficulty = ");
            builder.push_bind(difficulty.as_str());
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }
        builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        builder.push_bind(filter.limit.max(0));

        let rows: Vec<QuizRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Quiz::try_from).collect()
    }

    async fn insert_quiz(&self, new: NewQuiz) -> Result<Quiz, StoreError> {
        let row: QuizRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO quizzes
                (title, description, role, difficulty, questions, time_limit,
                 passing_score, tags, category, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.role.as_str())
        .bind(new.difficulty.as_str())
        .bind(Json(&new.questions))
        .bind(new.time_limit)
        .bind(new.passing_score)
        .bind(Json(&new.tags))
        .bind(new.category.as_str())
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Quiz::try_from(row)
    }

    async fn update_quiz(&self, quiz_id: i64, patch: QuizPatch) -> Result<Quiz, StoreError> {
        // Merge over the current row; an administrative operation, so the
        // read-then-write here is not version-guarded.
        let current = self
            .quiz_by_id(quiz_id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.or(current.description);
        let role = patch.role.unwrap_or(current.role);
        let difficulty = patch.difficulty.unwrap_or(current.difficulty);
        let questions = patch.questions.unwrap_or(current.questions);
        let time_limit = patch.time_limit.unwrap_or(current.time_limit);
        let passing_score = patch.passing_score.unwrap_or(current.passing_score);
        let tags = patch.tags.unwrap_or(current.tags);
        let category = patch.category.unwrap_or(current.category);
        let is_active = patch.is_active.unwrap_or(current.is_active);

        let row: QuizRow = sqlx::query_as(&format!(
            r#"
            UPDATE quizzes SET
                title = $1, description = $2, role = $3, difficulty = $4,
                questions = $5, time_limit = $6, passing_score = $7,
                tags = $8, category = $9, is_active = $10
            WHERE id = $11
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&title)
        .bind(&description)
        .bind(role.as_str())
        .bind(difficulty.as_str())
        .bind(Json(&questions))
        .bind(time_limit)
        .bind(passing_score)
        .bind(Json(&tags))
        .bind(category.as_str())
        .bind(is_active)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;
        Quiz::try_from(row)
    }

    async fn deactivate_quiz(&self, quiz_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE quizzes SET is_active = FALSE WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn record_quiz_attempt(&self, quiz_id: i64, score: i64) -> Result<(), StoreError> {
        // SET expressions evaluate against the old row, so the incremental
        // average and the counter bump stay consistent in one statement.
        let result = sqlx::query(
            r#"
            UPDATE quizzes
            SET average_score = (average_score * attempts + $2) / (attempts + 1),
                attempts = attempts + 1
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .bind(score as f64)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user: Option<User> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn apply_user_update(&self, update: UserProgressUpdate) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<User> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET training_progress = $1,
                training_complete = $2,
                points = points + $3,
                version = version + 1
            WHERE id = $4 AND version = $5
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(update.training_progress)
        .bind(update.training_complete)
        .bind(update.points_delta)
        .bind(update.user_id)
        .bind(update.expected_version)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = updated else {
            tx.rollback().await?;
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(update.user_id)
                    .fetch_one(&self.pool)
                    .await?;
            return Err(if exists {
                StoreError::VersionConflict
            } else {
                StoreError::NotFound
            });
        };

        if let Some(badge) = &update.badge {
            sqlx::query(
                r#"
                INSERT INTO badges (user_id, name, description, result_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (result_id) DO NOTHING
                "#,
            )
            .bind(update.user_id)
            .bind(&badge.name)
            .bind(&badge.description)
            .bind(update.result_id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(certificate) = &update.certificate {
            sqlx::query(
                r#"
                INSERT INTO certificates (user_id, title, score, result_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (result_id) DO NOTHING
                "#,
            )
            .bind(update.user_id)
            .bind(&certificate.title)
            .bind(certificate.score)
            .bind(update.result_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    async fn badges_for_user(&self, user_id: i64) -> Result<Vec<Badge>, StoreError> {
        let badges: Vec<Badge> = sqlx::query_as(
            "SELECT name, description, earned_at FROM badges WHERE user_id = $1 \
             ORDER BY earned_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(badges)
    }

    async fn certificates_for_user(&self, user_id: i64) -> Result<Vec<Certificate>, StoreError> {
        let certificates: Vec<Certificate> = sqlx::query_as(
            "SELECT title, score, issued_at FROM certificates WHERE user_id = $1 \
             ORDER BY issued_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(certificates)
    }

    async fn insert_result(&self, new: NewQuizResult) -> Result<QuizResult, StoreError> {
        let row: ResultRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO quiz_results
                (user_id, quiz_id, score, points_earned, answers, game_mode,
                 role, time_spent, passed, certificate_eligible)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.quiz_id)
        .bind(new.score)
        .bind(new.points_earned)
        .bind(Json(&new.answers))
        .bind(new.game_mode.as_str())
        .bind(new.role.as_str())
        .bind(new.time_spent)
        .bind(new.passed)
        .bind(new.certificate_eligible)
        .fetch_one(&self.pool)
        .await?;
        QuizResult::try_from(row)
    }

    async fn results_for_user(
        &self,
        user_id: i64,
        filter: &HistoryFilter,
    ) -> Result<Vec<QuizResult>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results WHERE user_id = "
        ));
        builder.push_bind(user_id);
        if let Some(mode) = filter.game_mode {
            builder.push(" AND game_mode = ");
            builder.push_bind(mode.as_str());
        }
        if let Some(role) = filter.role {
            builder.push(" AND role = ");
            builder.push_bind(role.as_str());
        }
        builder.push(" ORDER BY completed_at DESC, id DESC LIMIT ");
        builder.push_bind(filter.limit.max(0));

        let rows: Vec<ResultRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(QuizResult::try_from).collect()
    }

    async fn contest_results_for_quiz(
        &self,
        quiz_id: i64,
        limit: i64,
    ) -> Result<Vec<QuizLeaderboardRow>, StoreError> {
        let rows: Vec<QuizLeaderboardRow> = sqlx::query_as(
            r#"
            SELECT r.user_id, u.username, r.score, r.time_spent, r.completed_at
            FROM quiz_results r
            JOIN users u ON u.id = r.user_id
            WHERE r.quiz_id = $1 AND r.game_mode = 'contest' AND u.is_active = TRUE
            ORDER BY r.score DESC, r.time_spent ASC
            LIMIT $2
            "#,
        )
        .bind(quiz_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_active_with_points_above(&self, points: i64) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE is_active = TRUE AND points > $1",
        )
        .bind(points)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn top_users_by_points(
        &self,
        role: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id AS user_id, username, points, training_progress \
             FROM users WHERE is_active = TRUE",
        );
        if let Some(role) = role {
            builder.push(" AND role = ");
            builder.push_bind(role.to_string());
        }
        builder.push(" ORDER BY points DESC, id ASC LIMIT ");
        builder.push_bind(limit.max(0));

        let rows: Vec<LeaderboardRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
