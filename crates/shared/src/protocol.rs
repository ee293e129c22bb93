use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{QuestionNumber, ResponseId},
    error::ApiError,
};

pub const SUBMIT_ACCEPTED_MESSAGE: &str = "Survey submitted successfully!";

pub fn submit_route() -> &'static str {
    "/api/submit"
}

pub fn responses_route() -> &'static str {
    "/api/responses"
}

/// Finished survey as sent to the answer store: submitted values keyed by
/// question number, points already folded into `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub answers: BTreeMap<QuestionNumber, String>,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl From<ApiError> for SubmitOutcome {
    fn from(value: ApiError) -> Self {
        Self::rejected(value.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResponse {
    pub id: ResponseId,
    pub answers: BTreeMap<QuestionNumber, String>,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
}

impl StoredResponse {
    pub fn answer_set(&self) -> AnswerSet {
        AnswerSet {
            answers: self.answers.clone(),
            score: self.score,
        }
    }
}
