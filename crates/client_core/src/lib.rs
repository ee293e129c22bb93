//! Respondent-side survey engine: question banks, the session state
//! machine, and the answer store it submits to.

use std::sync::Arc;

use async_trait::async_trait;
use shared::protocol::{AnswerSet, StoredResponse, SubmitOutcome};

pub mod controller;
pub mod error;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod spool;
pub mod transport;

pub use controller::{Step, SubmissionReport, SurveyController};
pub use error::{QuestionBankError, SessionError, StoreError};
pub use questions::{Question, QuestionBank, QuestionInput, QuestionOption};
pub use session::{Advance, Answer, DisplayState, InputView, SessionView, SurveySession};
pub use transport::HttpAnswerStore;

/// Where finished answer sets go. Implementations must not retry; the
/// session decides what a failure means for the respondent.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn submit(&self, answers: &AnswerSet) -> Result<SubmitOutcome, StoreError>;
    async fn list(&self) -> Result<Vec<StoredResponse>, StoreError>;
}

#[async_trait]
impl<T: AnswerStore + ?Sized> AnswerStore for Arc<T> {
    async fn submit(&self, answers: &AnswerSet) -> Result<SubmitOutcome, StoreError> {
        (**self).submit(answers).await
    }

    async fn list(&self) -> Result<Vec<StoredResponse>, StoreError> {
        (**self).list().await
    }
}
