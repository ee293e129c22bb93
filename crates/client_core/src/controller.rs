//! Binds a [`SurveySession`] to an [`AnswerStore`] so that finishing the
//! last question carries the submission through to completion.

use shared::protocol::AnswerSet;

use crate::{
    error::SessionError,
    questions::QuestionBank,
    session::{Advance, SurveySession},
    AnswerStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub answer_set: AnswerSet,
    /// Whether the store confirmed persistence. Advisory only: the session
    /// is completed either way.
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Moved { index: usize },
    Completed(SubmissionReport),
}

pub struct SurveyController<S> {
    session: SurveySession,
    store: S,
}

impl<S: AnswerStore> SurveyController<S> {
    pub fn new(bank: QuestionBank, store: S) -> Self {
        Self {
            session: SurveySession::new(bank),
            store,
        }
    }

    pub fn session(&self) -> &SurveySession {
        &self.session
    }

    /// Synchronous edits (answers, retreat, restart) go straight to the
    /// session.
    pub fn session_mut(&mut self) -> &mut SurveySession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn advance(&mut self) -> Result<Step, SessionError> {
        match self.session.advance()? {
            Advance::Moved { index } => Ok(Step::Moved { index }),
            Advance::Submit(answer_set) => self.deliver(answer_set).await.map(Step::Completed),
        }
    }

    pub async fn submit(&mut self) -> Result<SubmissionReport, SessionError> {
        let answer_set = self.session.begin_submission()?;
        self.deliver(answer_set).await
    }

    async fn deliver(&mut self, answer_set: AnswerSet) -> Result<SubmissionReport, SessionError> {
        let result = self.store.submit(&answer_set).await;
        let accepted = self.session.complete_submission(result)?;
        Ok(SubmissionReport {
            answer_set,
            accepted,
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
