// src/models/enums.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attempt type. Practice builds training progress; contest earns
/// leaderboard points once training is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Practice,
    Contest,
}

/// Audience role a quiz is written for. Distinct from the account role
/// carried in JWT claims ('user', 'manager', 'admin').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizRole {
    Student,
    Manager,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Communication,
    Leadership,
    Teamwork,
    ProblemSolving,
    TimeManagement,
    General,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Practice => "practice",
            GameMode::Contest => "contest",
        }
    }
}

impl QuizRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizRole::Student => "student",
            QuizRole::Manager => "manager",
            QuizRole::Client => "client",
        }
    }

    /// "student" -> "Student", used when composing certificate titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            QuizRole::Student => "Student",
            QuizRole::Manager => "Manager",
            QuizRole::Client => "Client",
        }
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Communication => "communication",
            Category::Leadership => "leadership",
            Category::Teamwork => "teamwork",
            Category::ProblemSolving => "problem-solving",
            Category::TimeManagement => "time-management",
            Category::General => "general",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ident, $label:literal, [$(($s:literal, $v:expr)),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($v),)+
                    other => Err(format!("invalid {}: '{}'", $label, other)),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_str_enum!(
    GameMode,
    "game mode",
    [("practice", GameMode::Practice), ("contest", GameMode::Contest)]
);

impl_str_enum!(
    QuizRole,
    "quiz role",
    [
        ("student", QuizRole::Student),
        ("manager", QuizRole::Manager),
        ("client", QuizRole::Client),
    ]
);

impl_str_enum!(
    Difficulty,
    "difficulty",
    [
        ("beginner", Difficulty::Beginner),
        ("intermediate", Difficulty::Intermediate),
        ("advanced", Difficulty::Advanced),
    ]
);

impl_str_enum!(
    Category,
    "category",
    [
        ("communication", Category::Communication),
        ("leadership", Category::Leadership),
        ("teamwork", Category::Teamwork),
        ("problem-solving", Category::ProblemSolving),
        ("time-management", Category::TimeManagement),
        ("general", Category::General),
    ]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        assert_eq!("contest".parse::<GameMode>().unwrap(), GameMode::Contest);
        assert_eq!(GameMode::Practice.to_string(), "practice");
        assert_eq!("client".parse::<QuizRole>().unwrap(), QuizRole::Client);
        assert_eq!(
            "problem-solving".parse::<Category>().unwrap(),
            Category::ProblemSolving
        );
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("speedrun".parse::<GameMode>().is_err());
        assert!("root".parse::<QuizRole>().is_err());
        assert!("".parse::<Difficulty>().is_err());
    }
}
