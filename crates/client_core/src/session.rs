//! Survey session state machine.
//!
//! A session tracks the current question, one answer slot per question and
//! whether the respondent has finished. Every operation mutates state
//! synchronously; the only asynchronous step, talking to the answer store,
//! is split into [`SurveySession::begin_submission`] and
//! [`SurveySession::complete_submission`] so the caller owns the await.

use std::collections::BTreeMap;

use shared::{
    domain::{InputKind, QuestionNumber},
    protocol::{AnswerSet, SubmitOutcome},
};
use tracing::{debug, info, warn};

use crate::{
    error::{SessionError, StoreError},
    questions::{Question, QuestionBank, QuestionInput},
    scoring::{parse_points, slider_points},
};

pub const NEXT_LABEL: &str = "Next";
pub const FINISH_LABEL: &str = "Finish Survey";
pub const SUBMISSION_FAILED_NOTICE: &str =
    "Unable to reach the survey server. Your answers were kept on this device.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub value: String,
    pub points: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    /// The last question was answered; the set must now go to the store.
    Submit(AnswerSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputView {
    Options {
        kind: InputKind,
        options: Vec<OptionView>,
    },
    Slider {
        min: i64,
        max: i64,
        value: Option<i64>,
    },
}

/// Everything a front end needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub display: DisplayState,
    pub question_number: QuestionNumber,
    pub total_questions: usize,
    pub progress: f64,
    pub prompt: String,
    pub input: InputView,
    pub score: i64,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub next_label: &'static str,
    pub submitting: bool,
    pub final_score: Option<i64>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SurveySession {
    bank: QuestionBank,
    current_index: usize,
    answers: Vec<Option<Answer>>,
    display: DisplayState,
    submission_in_flight: bool,
    final_score: Option<i64>,
    notice: Option<String>,
}

impl SurveySession {
    pub fn new(bank: QuestionBank) -> Self {
        let answers = vec![None; bank.len()];
        Self {
            bank,
            current_index: 0,
            answers,
            display: DisplayState::InProgress,
            submission_in_flight: false,
            final_score: None,
            notice: None,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.bank.questions()[self.current_index]
    }

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_in_flight
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn final_score(&self) -> Option<i64> {
        self.final_score
    }

    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().flatten().count()
    }

    /// Value of the option currently marked selected for a question.
    pub fn selected_value(&self, index: usize) -> Option<&str> {
        self.answer(index).map(|answer| answer.value.as_str())
    }

    /// Sum of the points of every recorded answer, saturating at the `i64`
    /// bounds. Always recomputed.
    pub fn score(&self) -> i64 {
        self.answers
            .iter()
            .flatten()
            .fold(0i64, |total, answer| total.saturating_add(answer.points))
    }

    /// Records the single selection for a choice or emoji question,
    /// replacing any earlier one. `raw_points` goes through [`parse_points`].
    pub fn select_option(
        &mut self,
        index: usize,
        value: impl Into<String>,
        raw_points: Option<&str>,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let question = self.question_at(index)?;
        if question.input.kind() == InputKind::Slider {
            return Err(SessionError::InputKindMismatch {
                number: question.number.0,
                attempted: "option",
            });
        }

        let answer = Answer {
            value: value.into(),
            points: parse_points(raw_points),
        };
        debug!(question = index + 1, value = %answer.value, points = answer.points, "option selected");
        self.answers[index] = Some(answer);
        Ok(())
    }

    /// Selects the option at `position` (0-based) of a choice or emoji
    /// question using its authored value and points.
    pub fn choose(&mut self, index: usize, position: usize) -> Result<(), SessionError> {
        let question = self.question_at(index)?;
        let option = question
            .input
            .options()
            .get(position)
            .ok_or(SessionError::UnknownOption {
                number: question.number.0,
                position,
            })?
            .clone();
        self.select_option(index, option.value, option.points.as_deref())
    }

    pub fn set_slider_value(&mut self, index: usize, raw_value: i64) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let question = self.question_at(index)?;
        let QuestionInput::Slider { min, max } = question.input else {
            return Err(SessionError::InputKindMismatch {
                number: question.number.0,
                attempted: "slider",
            });
        };
        if !(min..=max).contains(&raw_value) {
            return Err(SessionError::SliderOutOfRange {
                number: question.number.0,
                value: raw_value,
                min,
                max,
            });
        }

        self.answers[index] = Some(Answer {
            value: raw_value.to_string(),
            points: slider_points(raw_value),
        });
        Ok(())
    }

    /// Moves to the next question, or hands back the answer set when the
    /// last question is answered. The current question must be answered.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_editable()?;
        if self.answers[self.current_index].is_none() {
            return Err(SessionError::IncompleteAnswer {
                number: self.current_question().number.0,
            });
        }

        if self.current_index + 1 < self.total_questions() {
            self.current_index += 1;
            Ok(Advance::Moved {
                index: self.current_index,
            })
        } else {
            self.begin_submission().map(Advance::Submit)
        }
    }

    /// Steps back one question; a no-op on the first question.
    pub fn retreat(&mut self) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.current_index > 0 {
            self.current_index -= 1;
        }
        Ok(())
    }

    /// Marks a submission in flight and returns the payload to send.
    pub fn begin_submission(&mut self) -> Result<AnswerSet, SessionError> {
        self.ensure_editable()?;
        self.submission_in_flight = true;
        Ok(self.answer_set())
    }

    /// Finishes an in-flight submission. The session reaches `Completed`
    /// whatever the store said; a failure only leaves a notice behind.
    pub fn complete_submission(
        &mut self,
        result: Result<SubmitOutcome, StoreError>,
    ) -> Result<bool, SessionError> {
        if !self.submission_in_flight {
            return Err(SessionError::NoSubmissionInFlight);
        }
        self.submission_in_flight = false;

        let accepted = match result {
            Ok(outcome) if outcome.success => {
                info!(
                    score = self.score(),
                    store_message = outcome.message.as_deref().unwrap_or_default(),
                    "survey submitted"
                );
                true
            }
            Ok(outcome) => {
                warn!(
                    error = outcome.error.as_deref().unwrap_or("unspecified"),
                    "answer store declined survey submission"
                );
                false
            }
            Err(error) => {
                warn!(%error, "failed to submit survey");
                false
            }
        };

        if !accepted {
            self.notice = Some(SUBMISSION_FAILED_NOTICE.to_string());
        }
        self.final_score = Some(self.score());
        self.display = DisplayState::Completed;
        Ok(accepted)
    }

    /// Back to the first question with nothing answered.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.answers.iter_mut().for_each(|slot| *slot = None);
        self.display = DisplayState::InProgress;
        self.submission_in_flight = false;
        self.final_score = None;
        self.notice = None;
    }

    /// Submission payload: 1-based question numbers mapped to values.
    pub fn answer_set(&self) -> AnswerSet {
        let answers: BTreeMap<QuestionNumber, String> = self
            .answers
            .iter()
            .enumerate()
            .filter_map(|(index, answer)| {
                answer
                    .as_ref()
                    .map(|answer| (QuestionNumber::from_index(index), answer.value.clone()))
            })
            .collect();
        AnswerSet {
            answers,
            score: self.score(),
        }
    }

    pub fn view(&self) -> SessionView {
        let question = self.current_question();
        let total = self.total_questions();
        let in_progress = self.display == DisplayState::InProgress && !self.submission_in_flight;
        let is_last = self.current_index + 1 == total;

        let input = match &question.input {
            QuestionInput::Slider { min, max } => InputView::Slider {
                min: *min,
                max: *max,
                value: self
                    .answer(self.current_index)
                    .and_then(|answer| answer.value.parse().ok()),
            },
            other => {
                let selected = self.selected_value(self.current_index);
                InputView::Options {
                    kind: other.kind(),
                    options: other
                        .options()
                        .iter()
                        .map(|option| OptionView {
                            label: option.label.clone(),
                            value: option.value.clone(),
                            selected: selected == Some(option.value.as_str()),
                        })
                        .collect(),
                }
            }
        };

        SessionView {
            display: self.display,
            question_number: question.number,
            total_questions: total,
            progress: (self.current_index + 1) as f64 / total as f64,
            prompt: question.prompt.clone(),
            input,
            score: self.score(),
            can_go_next: in_progress && self.answers[self.current_index].is_some(),
            can_go_previous: in_progress && self.current_index > 0,
            next_label: if is_last { FINISH_LABEL } else { NEXT_LABEL },
            submitting: self.submission_in_flight,
            final_score: self.final_score,
            notice: self.notice.clone(),
        }
    }

    fn question_at(&self, index: usize) -> Result<&Question, SessionError> {
        self.bank.get(index).ok_or(SessionError::QuestionOutOfRange {
            index,
            total: self.total_questions(),
        })
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.submission_in_flight {
            return Err(SessionError::SubmissionInFlight);
        }
        if self.display == DisplayState::Completed {
            return Err(SessionError::NotInProgress);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
