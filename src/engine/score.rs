// src/engine/score.rs

use crate::models::quiz::Question;

/// Outcome of scoring one answer sheet against a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// 0-100, rounded percentage of points earned.
    pub score: i64,
    /// Sum of point values of correctly answered questions.
    pub correct_points: i64,
    /// Sum of all question point values.
    pub total_points: i64,
}

/// Sentinel used for answers the client did not submit. Indistinguishable
/// from a genuine first-option pick, which is the documented leniency
/// trade-off of the normalization policy.
pub const MISSING_ANSWER: i64 = 0;

/// Aligns a submitted answer sequence with the quiz's question count:
/// missing tail entries are padded with [`MISSING_ANSWER`], extras are
/// truncated. A length mismatch is never an error.
pub fn normalize_answers(answers: &[i64], question_count: usize) -> Vec<i64> {
    (0..question_count)
        .map(|i| answers.get(i).copied().unwrap_or(MISSING_ANSWER))
        .collect()
}

/// Scores an already-normalized answer sheet. Full question points on an
/// exact index match, zero otherwise. Pure and deterministic.
///
/// A quiz whose questions carry zero total points scores 0 instead of
/// dividing by zero; the scoring step is total over its input domain.
pub fn score_answers(questions: &[Question], answers: &[i64]) -> ScoreBreakdown {
    let mut correct_points = 0;
    let mut total_points = 0;

    for (index, question) in questions.iter().enumerate() {
        total_points += question.points;
        if answers.get(index) == Some(&question.correct_answer) {
            correct_points += question.points;
        }
    }

    let score = if total_points == 0 {
        0
    } else {
        ((correct_points as f64 / total_points as f64) * 100.0).round() as i64
    };

    ScoreBreakdown {
        score,
        correct_points,
        total_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: i64, points: i64) -> Question {
        Question {
            prompt: "q".to_string(),
            options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            correct_answer: correct,
            explanation: None,
            points,
        }
    }

    #[test]
    fn all_correct_scores_100() {
        let questions = vec![question(0, 10), question(1, 10), question(2, 10)];
        let result = score_answers(&questions, &[0, 1, 2]);
        assert_eq!(result.score, 100);
        assert_eq!(result.correct_points, 30);
        assert_eq!(result.total_points, 30);
    }

    #[test]
    fn all_wrong_scores_0() {
        let questions = vec![question(0, 10), question(1, 10)];
        let result = score_answers(&questions, &[1, 0]);
        assert_eq!(result.score, 0);
        assert_eq!(result.correct_points, 0);
    }

    #[test]
    fn partial_credit_rounds() {
        // 10 of 30 points -> 33.33 rounds to 33.
        let questions = vec![question(0, 10), question(0, 10), question(0, 10)];
        let result = score_answers(&questions, &[0, 1, 1]);
        assert_eq!(result.score, 33);

        // 20 of 30 -> 66.67 rounds to 67.
        let result = score_answers(&questions, &[0, 0, 1]);
        assert_eq!(result.score, 67);
    }

    #[test]
    fn uneven_point_values_weight_the_score() {
        let questions = vec![question(0, 30), question(0, 10)];
        let result = score_answers(&questions, &[0, 1]);
        assert_eq!(result.score, 75);
        assert_eq!(result.correct_points, 30);
        assert_eq!(result.total_points, 40);
    }

    #[test]
    fn zero_point_quiz_scores_zero_not_panic() {
        let result = score_answers(&[], &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = vec![question(2, 10), question(1, 5)];
        let answers = [2, 0];
        let first = score_answers(&questions, &answers);
        for _ in 0..10 {
            assert_eq!(score_answers(&questions, &answers), first);
        }
    }

    #[test]
    fn normalize_pads_short_submissions_with_sentinel() {
        assert_eq!(normalize_answers(&[2], 3), vec![2, 0, 0]);
        assert_eq!(normalize_answers(&[], 2), vec![0, 0]);
    }

    #[test]
    fn normalize_truncates_long_submissions() {
        assert_eq!(normalize_answers(&[1, 2, 3, 4], 2), vec![1, 2]);
    }

    #[test]
    fn padded_tail_scores_like_explicit_sentinels() {
        let questions = vec![question(1, 10), question(1, 10), question(1, 10)];
        let short = normalize_answers(&[1], 3);
        let explicit = [1, MISSING_ANSWER, MISSING_ANSWER];
        assert_eq!(
            score_answers(&questions, &short),
            score_answers(&questions, &explicit)
        );
    }

    #[test]
    fn padded_sentinel_counts_as_correct_when_answer_is_first_option() {
        // The documented leniency: a padded 0 is indistinguishable from a
        // deliberate first-option pick.
        let questions = vec![question(1, 10), question(0, 10)];
        let result = score_answers(&questions, &normalize_answers(&[1], 2));
        assert_eq!(result.score, 100);
    }
}
