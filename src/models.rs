// Several types are shared between the CLI, the TUI and the store, not all used by each
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

// A signed-in identity snapshot. Guests have a client-local id and no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub is_guest: bool,
}

impl User {
    pub fn registered(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_guest: false,
        }
    }

    pub fn guest() -> Self {
        Self {
            id: format!("guest-{:08x}", rand::random::<u32>()),
            is_guest: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizMode {
    Practice,
    Training,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Practice => "practice",
            QuizMode::Training => "training",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "practice" | "p" => Some(QuizMode::Practice),
            "training" | "train" | "t" => Some(QuizMode::Training),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizMode::Practice => "Practice Mode",
            QuizMode::Training => "Training Mode",
        }
    }
}

// A question as it comes out of the store, options still serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: i64,
    pub topic: String,
    pub prompt: String,
    pub options: String,
    pub correct_index: i64,
}

impl StoredQuestion {
    /// Deserialize the option list and check the index points into it.
    pub fn parse(self) -> Result<Question> {
        let options: Vec<String> =
            serde_json::from_str(&self.options).map_err(|e| QuizError::MalformedQuestion {
                question_id: self.id,
                reason: format!("options are not a JSON list of strings: {}", e),
            })?;

        Question::new(
            self.id,
            self.topic,
            self.prompt,
            options,
            self.correct_index,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub topic: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn new(
        id: i64,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: i64,
    ) -> Result<Self> {
        if options.len() < 2 {
            return Err(QuizError::MalformedQuestion {
                question_id: id,
                reason: format!("needs at least 2 options, got {}", options.len()),
            });
        }
        if correct_index < 0 || correct_index as usize >= options.len() {
            return Err(QuizError::MalformedQuestion {
                question_id: id,
                reason: format!(
                    "correct index {} is outside 0..{}",
                    correct_index,
                    options.len()
                ),
            });
        }

        Ok(Self {
            id,
            topic: topic.into(),
            prompt: prompt.into(),
            options,
            correct_index: correct_index as usize,
        })
    }

    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }

    pub fn option_letter(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }
}

// Append-only record of one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: String,
    pub question_id: i64,
    pub topic: String,
    pub selected_index: Option<usize>,
    pub is_correct: bool,
    pub time_taken_seconds: u32,
    pub timestamp: DateTime<Utc>,
}

// An attempt before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttempt {
    pub user_id: String,
    pub question_id: i64,
    pub topic: String,
    pub selected_index: Option<usize>,
    pub is_correct: bool,
    pub time_taken_seconds: u32,
    pub timestamp: DateTime<Utc>,
}

// Per-user, per-question mastery bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub user_id: String,
    pub question_id: i64,
    pub wrong_attempts: u32,
    pub mastered_at: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    pub fn is_mastered(&self) -> bool {
        self.mastered_at.is_some()
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(options: &str, correct_index: i64) -> StoredQuestion {
        StoredQuestion {
            id: 7,
            topic: "algebra".to_string(),
            prompt: "Solve x + 1 = 2".to_string(),
            options: options.to_string(),
            correct_index,
        }
    }

    mod question_tests {
        use super::*;

        #[test]
        fn parse_valid_options() {
            let q = stored(r#"["0", "1", "2"]"#, 1).parse().unwrap();
            assert_eq!(q.options, vec!["0", "1", "2"]);
            assert_eq!(q.correct_index, 1);
            assert_eq!(q.topic, "algebra");
        }

        #[test]
        fn parse_rejects_non_json_options() {
            let err = stored("0, 1, 2", 0).parse().unwrap_err();
            assert!(matches!(
                err,
                QuizError::MalformedQuestion { question_id: 7, .. }
            ));
        }

        #[test]
        fn parse_rejects_object_options() {
            let err = stored(r#"{"a": 1}"#, 0).parse().unwrap_err();
            assert!(matches!(err, QuizError::MalformedQuestion { .. }));
        }

        #[test]
        fn parse_rejects_single_option() {
            let err = stored(r#"["only"]"#, 0).parse().unwrap_err();
            assert!(matches!(err, QuizError::MalformedQuestion { .. }));
        }

        #[test]
        fn parse_rejects_index_past_end() {
            let err = stored(r#"["a", "b"]"#, 2).parse().unwrap_err();
            assert!(matches!(err, QuizError::MalformedQuestion { .. }));
        }

        #[test]
        fn parse_rejects_negative_index() {
            let err = stored(r#"["a", "b"]"#, -1).parse().unwrap_err();
            assert!(matches!(err, QuizError::MalformedQuestion { .. }));
        }

        #[test]
        fn is_correct_compares_index() {
            let q = stored(r#"["a", "b", "c"]"#, 2).parse().unwrap();
            assert!(q.is_correct(2));
            assert!(!q.is_correct(0));
        }

        #[test]
        fn option_letters() {
            assert_eq!(Question::option_letter(0), 'A');
            assert_eq!(Question::option_letter(3), 'D');
        }
    }

    mod quiz_mode_tests {
        use super::*;

        #[test]
        fn as_str_round_trips() {
            for mode in [QuizMode::Practice, QuizMode::Training] {
                assert_eq!(QuizMode::from_str(mode.as_str()), Some(mode));
            }
        }

        #[test]
        fn from_str_short_forms() {
            assert_eq!(QuizMode::from_str("P"), Some(QuizMode::Practice));
            assert_eq!(QuizMode::from_str("train"), Some(QuizMode::Training));
            assert!(QuizMode::from_str("exam").is_none());
        }
    }

    mod user_tests {
        use super::*;

        #[test]
        fn guest_is_flagged() {
            let user = User::guest();
            assert!(user.is_guest);
            assert!(user.id.starts_with("guest-"));
        }

        #[test]
        fn registered_is_not_guest() {
            let user = User::registered("u-1");
            assert!(!user.is_guest);
            assert_eq!(user.id, "u-1");
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_with_number() {
            let output = JsonOutput::ok(42);
            assert!(output.success);
            assert_eq!(output.data, Some(42));
            assert!(output.error.is_none());
        }

        #[test]
        fn err_with_string() {
            let output = JsonOutput::<()>::err("something went wrong");
            assert!(!output.success);
            assert!(output.data.is_none());
            assert_eq!(output.error, Some("something went wrong".to_string()));
        }

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }
    }
}
