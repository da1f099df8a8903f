// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::enums::{Category, Difficulty, QuizRole};

/// One question of a quiz. Stored inline with its quiz as JSONB; immutable
/// once the quiz has recorded attempts (edits are an administrative
/// operation with no versioning of historical results).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,

    /// At least two options; enforced at quiz create/update.
    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_answer: i64,

    pub explanation: Option<String>,

    /// Point value credited on a correct answer.
    #[serde(default = "default_question_points")]
    pub points: i64,
}

fn default_question_points() -> i64 {
    10
}

/// A quiz as the engine sees it. Soft-deleted via `is_active` once it has
/// recorded attempts; never physically removed.
#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub role: QuizRole,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    /// Minutes.
    pub time_limit: i64,
    /// 0-100; a submission passes when score >= passing_score.
    pub passing_score: i64,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub category: Category,
    pub created_by: i64,
    /// Running statistics, updated atomically per attempt.
    pub attempts: i64,
    pub average_score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Question as sent to clients: the correct answer and explanation stay
/// server-side.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub points: i64,
}

/// Quiz DTO for players, answers hidden.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub role: QuizRole,
    pub difficulty: Difficulty,
    pub time_limit: i64,
    pub passing_score: i64,
    pub category: Category,
    pub tags: Vec<String>,
    pub questions: Vec<PublicQuestion>,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        PublicQuiz {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            role: quiz.role,
            difficulty: quiz.difficulty,
            time_limit: quiz.time_limit,
            passing_score: quiz.passing_score,
            category: quiz.category,
            tags: quiz.tags,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    prompt: q.prompt,
                    options: q.options,
                    points: q.points,
                })
                .collect(),
        }
    }
}

/// Listing row for quiz catalogs.
#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub category: Category,
    pub tags: Vec<String>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        QuizSummary {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            difficulty: quiz.difficulty,
            question_count: quiz.questions.len(),
            category: quiz.category,
            tags: quiz.tags.clone(),
        }
    }
}

/// Incoming question payload for quiz create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionInput {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub explanation: Option<String>,
    #[serde(default = "default_question_points")]
    pub points: i64,
}

/// DTO for creating a new quiz (manager only).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200."))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub role: QuizRole,
    pub difficulty: Option<Difficulty>,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<QuestionInput>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 1, max = 480))]
    pub time_limit: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i64>,
}

/// DTO for updating a quiz. Creator and running statistics are not
/// patchable through this surface.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub role: Option<QuizRole>,
    pub difficulty: Option<Difficulty>,
    #[validate(custom(function = validate_questions))]
    pub questions: Option<Vec<QuestionInput>>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 1, max = 480))]
    pub time_limit: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i64>,
    pub is_active: Option<bool>,
}

fn validate_questions(questions: &[QuestionInput]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("at_least_one_question"));
    }
    for q in questions {
        if q.prompt.trim().is_empty() {
            return Err(validator::ValidationError::new("empty_prompt"));
        }
        if q.options.len() < 2 {
            return Err(validator::ValidationError::new("need_two_options"));
        }
        if q.correct_answer < 0 || q.correct_answer as usize >= q.options.len() {
            return Err(validator::ValidationError::new("correct_answer_out_of_range"));
        }
        if q.points <= 0 {
            return Err(validator::ValidationError::new("points_must_be_positive"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: i64, option_count: usize) -> QuestionInput {
        QuestionInput {
            prompt: "What is the airspeed of an unladen swallow?".to_string(),
            options: (0..option_count).map(|i| format!("option {i}")).collect(),
            correct_answer: correct,
            explanation: None,
            points: 10,
        }
    }

    #[test]
    fn validate_questions_accepts_well_formed() {
        assert!(validate_questions(&[question(0, 2), question(3, 4)]).is_ok());
    }

    #[test]
    fn validate_questions_rejects_out_of_range_answer() {
        assert!(validate_questions(&[question(2, 2)]).is_err());
        assert!(validate_questions(&[question(-1, 2)]).is_err());
    }

    #[test]
    fn validate_questions_rejects_single_option() {
        assert!(validate_questions(&[question(0, 1)]).is_err());
    }

    #[test]
    fn validate_questions_rejects_empty_set() {
        assert!(validate_questions(&[]).is_err());
    }
}
