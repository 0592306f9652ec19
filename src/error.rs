use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("no weak topics found yet, try practice mode first to build a learning profile")]
    NoWeakTopics,

    #[error("no questions available")]
    NoQuestionsAvailable,

    #[error("question {question_id} is malformed: {reason}")]
    MalformedQuestion { question_id: i64, reason: String },

    #[error("store error: {0}")]
    Transport(#[from] rusqlite::Error),

    #[error("line {line}: {reason}")]
    Import { line: usize, reason: String },
}

/// Coarse classification of a `QuizError`, cheap to copy into session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoWeakTopics,
    NoQuestions,
    Malformed,
    Transport,
    Import,
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::NoWeakTopics => ErrorKind::NoWeakTopics,
            QuizError::NoQuestionsAvailable => ErrorKind::NoQuestions,
            QuizError::MalformedQuestion { .. } => ErrorKind::Malformed,
            QuizError::Transport(_) => ErrorKind::Transport,
            QuizError::Import { .. } => ErrorKind::Import,
        }
    }
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NoWeakTopics => {
                "No weak areas found yet! Try Practice Mode first to build your learning profile."
            }
            ErrorKind::NoQuestions => "No questions available. Import some questions first.",
            ErrorKind::Malformed => "Something went wrong loading the questions.",
            ErrorKind::Transport => "Could not reach the question store. Press r to retry.",
            ErrorKind::Import => "The question file could not be imported.",
        }
    }
}
