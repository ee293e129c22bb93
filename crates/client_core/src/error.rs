use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question index {index} is outside the survey (0..{total})")]
    QuestionOutOfRange { index: usize, total: usize },
    #[error("question {number} does not take {attempted} input")]
    InputKindMismatch { number: u32, attempted: &'static str },
    #[error("question {number} has no option at position {position}")]
    UnknownOption { number: u32, position: usize },
    #[error("slider value {value} for question {number} is outside {min}..={max}")]
    SliderOutOfRange {
        number: u32,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("question {number} must be answered before moving on")]
    IncompleteAnswer { number: u32 },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("no submission is in flight")]
    NoSubmissionInFlight,
    #[error("the survey is completed; restart to answer again")]
    NotInProgress,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid answer store url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("answer store request timed out")]
    Timeout,
    #[error("answer store unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("answer store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("answer store returned an unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank has no questions")]
    Empty,
    #[error("question at position {position} is numbered {found}; expected {expected}")]
    NonSequentialNumber {
        position: usize,
        expected: u32,
        found: u32,
    },
    #[error("question {number} has no options")]
    NoOptions { number: u32 },
    #[error("question {number} repeats option value '{value}'")]
    DuplicateOption { number: u32, value: String },
    #[error("question {number} has an option with an empty value")]
    EmptyOptionValue { number: u32 },
    #[error("question {number} slider range {min}..={max} is empty")]
    EmptySliderRange { number: u32, min: i64, max: i64 },
}
