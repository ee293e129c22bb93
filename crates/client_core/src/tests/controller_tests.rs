use super::*;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::QuestionNumber,
    protocol::{StoredResponse, SubmitOutcome},
};

use crate::{
    error::StoreError,
    questions::{Question, QuestionInput, QuestionOption},
    session::{DisplayState, SUBMISSION_FAILED_NOTICE},
};

#[derive(Default)]
struct RecordingStore {
    submitted: Mutex<Vec<AnswerSet>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn submissions(&self) -> Vec<AnswerSet> {
        self.submitted.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AnswerStore for RecordingStore {
    async fn submit(&self, answers: &AnswerSet) -> Result<SubmitOutcome, StoreError> {
        self.submitted.lock().expect("lock").push(answers.clone());
        if self.fail {
            return Err(StoreError::Rejected {
                status: 500,
                message: "storage unavailable".into(),
            });
        }
        Ok(SubmitOutcome::accepted("Survey submitted successfully!"))
    }

    async fn list(&self) -> Result<Vec<StoredResponse>, StoreError> {
        Ok(Vec::new())
    }
}

fn choice(number: u32, value: &str, points: &str) -> Question {
    Question {
        number: QuestionNumber(number),
        prompt: format!("Question {number}"),
        input: QuestionInput::Choice {
            options: vec![QuestionOption {
                label: value.to_uppercase(),
                value: value.into(),
                points: Some(points.into()),
            }],
        },
    }
}

fn scenario_bank() -> QuestionBank {
    QuestionBank::new(vec![
        choice(1, "great", "5"),
        Question {
            number: QuestionNumber(2),
            prompt: "Slide".into(),
            input: QuestionInput::Slider { min: 0, max: 10 },
        },
        choice(3, "often", "2"),
    ])
    .expect("bank")
}

async fn answer_and_finish<S: AnswerStore>(controller: &mut SurveyController<S>) -> Step {
    controller.session_mut().choose(0, 0).expect("q1");
    assert_eq!(
        controller.advance().await.expect("to q2"),
        Step::Moved { index: 1 }
    );
    controller
        .session_mut()
        .set_slider_value(1, 3)
        .expect("q2");
    assert_eq!(
        controller.advance().await.expect("to q3"),
        Step::Moved { index: 2 }
    );
    controller.session_mut().choose(2, 0).expect("q3");
    controller.advance().await.expect("finish")
}

#[tokio::test]
async fn finishing_the_last_question_submits_the_answer_set() {
    let store = Arc::new(RecordingStore::default());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());

    let Step::Completed(report) = answer_and_finish(&mut controller).await else {
        panic!("expected completion");
    };

    let expected = AnswerSet {
        answers: [
            (QuestionNumber(1), "great".to_string()),
            (QuestionNumber(2), "3".to_string()),
            (QuestionNumber(3), "often".to_string()),
        ]
        .into_iter()
        .collect(),
        score: 13,
    };
    assert!(report.accepted);
    assert_eq!(report.answer_set, expected);
    assert_eq!(store.submissions(), vec![expected]);
    assert_eq!(controller.session().display_state(), DisplayState::Completed);
    assert_eq!(controller.session().final_score(), Some(13));
}

#[tokio::test]
async fn advancing_before_the_last_question_never_submits() {
    let store = Arc::new(RecordingStore::default());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());

    controller.session_mut().choose(0, 0).expect("q1");
    controller.advance().await.expect("advance");

    assert!(store.submissions().is_empty());
    assert_eq!(controller.session().current_index(), 1);
}

#[tokio::test]
async fn store_failure_still_completes_with_notice() {
    let store = Arc::new(RecordingStore::failing());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());

    let Step::Completed(report) = answer_and_finish(&mut controller).await else {
        panic!("expected completion");
    };

    assert!(!report.accepted);
    assert_eq!(store.submissions().len(), 1);
    let view = controller.session().view();
    assert_eq!(view.display, DisplayState::Completed);
    assert_eq!(view.final_score, Some(13));
    assert_eq!(view.notice.as_deref(), Some(SUBMISSION_FAILED_NOTICE));
}

#[tokio::test]
async fn completed_survey_cannot_be_submitted_twice() {
    let store = Arc::new(RecordingStore::default());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());
    answer_and_finish(&mut controller).await;

    assert_eq!(
        controller.submit().await,
        Err(SessionError::NotInProgress)
    );
    assert_eq!(controller.advance().await, Err(SessionError::NotInProgress));
    assert_eq!(store.submissions().len(), 1);
}

#[tokio::test]
async fn restart_after_completion_allows_a_fresh_run() {
    let store = Arc::new(RecordingStore::default());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());
    answer_and_finish(&mut controller).await;

    controller.session_mut().restart();
    assert_eq!(
        controller.session().display_state(),
        DisplayState::InProgress
    );
    answer_and_finish(&mut controller).await;
    assert_eq!(store.submissions().len(), 2);
}

#[tokio::test]
async fn unanswered_question_blocks_advance() {
    let store = Arc::new(RecordingStore::default());
    let mut controller = SurveyController::new(scenario_bank(), store.clone());

    assert_eq!(
        controller.advance().await,
        Err(SessionError::IncompleteAnswer { number: 1 })
    );
    assert!(store.submissions().is_empty());
}
