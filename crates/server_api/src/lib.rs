use shared::{
    error::{ApiError, ErrorCode},
    protocol::{AnswerSet, StoredResponse, SubmitOutcome, SUBMIT_ACCEPTED_MESSAGE},
};
use storage::Storage;
use tracing::{error, info};

pub const MAX_ANSWERS_PER_SET: usize = 200;
pub const MAX_ANSWER_VALUE_BYTES: usize = 512;

/// Request-independent handle on the answer store. `storage` is `None` when
/// the database could not be opened at startup; store operations then fail
/// with [`ErrorCode::Unavailable`] while unrelated routes keep working.
#[derive(Clone)]
pub struct ApiContext {
    pub storage: Option<Storage>,
}

impl ApiContext {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub fn unavailable() -> Self {
        Self { storage: None }
    }

    fn storage(&self) -> Result<&Storage, ApiError> {
        self.storage
            .as_ref()
            .ok_or_else(|| ApiError::new(ErrorCode::Unavailable, "storage unavailable"))
    }
}

pub fn validate_answer_set(answers: &AnswerSet) -> Result<(), ApiError> {
    if answers.answers.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "answer set must contain at least one answer",
        ));
    }
    if answers.answers.len() > MAX_ANSWERS_PER_SET {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("answer set exceeds {MAX_ANSWERS_PER_SET} answers"),
        ));
    }
    for (number, value) in &answers.answers {
        if number.index().is_none() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "question numbers start at 1",
            ));
        }
        if value.len() > MAX_ANSWER_VALUE_BYTES {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("answer to question {number} exceeds {MAX_ANSWER_VALUE_BYTES} bytes"),
            ));
        }
    }
    Ok(())
}

pub async fn submit_answers(
    ctx: &ApiContext,
    answers: &AnswerSet,
) -> Result<SubmitOutcome, ApiError> {
    validate_answer_set(answers)?;
    let stored = ctx
        .storage()?
        .insert_response(answers)
        .await
        .map_err(internal)?;
    info!(
        response_id = %stored.id,
        score = stored.score,
        answers = stored.answers.len(),
        "survey response stored"
    );
    Ok(SubmitOutcome::accepted(SUBMIT_ACCEPTED_MESSAGE))
}

pub async fn list_responses(ctx: &ApiContext) -> Result<Vec<StoredResponse>, ApiError> {
    ctx.storage()?.list_responses().await.map_err(internal)
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage()?.health_check().await.map_err(|e| {
        ApiError::new(ErrorCode::Unavailable, e.to_string())
    })
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "answer store operation failed");
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}
