use std::path::PathBuf;
use std::time::Duration;

use crate::models::User;

const DEFAULT_DB_NAME: &str = "mathbubble.db";
const LOG_FILE_NAME: &str = "mathbubble.log";

pub const DB_ENV_VAR: &str = "MATHBUBBLE_DB";
pub const USER_ENV_VAR: &str = "MATHBUBBLE_USER";

/// Tunables for one quiz run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub questions_per_quiz: usize,
    pub max_lives: u32,
    pub max_attempts_per_question: u32,
    /// Upper bound on candidates fetched for training mode before shuffling.
    pub training_pool_limit: usize,
    pub correct_delay: Duration,
    pub reveal_delay: Duration,
    pub retry_delay: Duration,
    pub game_over_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_quiz: 5,
            max_lives: 5,
            max_attempts_per_question: 3,
            training_pool_limit: 50,
            correct_delay: Duration::from_millis(800),
            reveal_delay: Duration::from_millis(1500),
            retry_delay: Duration::from_millis(600),
            game_over_delay: Duration::from_millis(1000),
        }
    }
}

impl QuizConfig {
    pub fn with_questions(mut self, count: Option<usize>) -> Self {
        if let Some(count) = count.filter(|c| *c > 0) {
            self.questions_per_quiz = count;
        }
        self
    }
}

// Thresholds for the weak-topic classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeakTopicCriteria {
    pub max_count: usize,
    pub min_samples: u32,
    pub accuracy_ceiling: f64,
}

impl Default for WeakTopicCriteria {
    fn default() -> Self {
        Self {
            max_count: 5,
            min_samples: 2,
            accuracy_ceiling: 0.80,
        }
    }
}

fn config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mathbubble");

    std::fs::create_dir_all(&dir).ok();
    dir
}

pub fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_ENV_VAR) {
        return PathBuf::from(path);
    }

    config_dir().join(DEFAULT_DB_NAME)
}

pub fn get_log_path() -> PathBuf {
    get_db_path()
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

/// Snapshot of who is playing. Explicit flags win over the environment.
pub fn resolve_user(user_flag: Option<&str>, guest: bool) -> User {
    if guest {
        return User::guest();
    }

    let from_env = std::env::var(USER_ENV_VAR).ok();
    match user_flag.map(str::to_string).or(from_env) {
        Some(id) if !id.trim().is_empty() => User::registered(id.trim()),
        _ => User::guest(),
    }
}
