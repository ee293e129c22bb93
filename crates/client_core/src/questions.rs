//! Question definitions. Banks are authored elsewhere and loaded as JSON;
//! the session only reads them.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use shared::domain::{InputKind, QuestionNumber};

use crate::{error::QuestionBankError, scoring::parse_points};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub value: String,
    /// Raw point value as authored; see [`QuestionOption::points`].
    #[serde(default, deserialize_with = "raw_points")]
    pub points: Option<String>,
}

impl QuestionOption {
    pub fn points(&self) -> i64 {
        parse_points(self.points.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionInput {
    Choice { options: Vec<QuestionOption> },
    Emoji { options: Vec<QuestionOption> },
    Slider { min: i64, max: i64 },
}

impl QuestionInput {
    pub fn kind(&self) -> InputKind {
        match self {
            QuestionInput::Choice { .. } => InputKind::Choice,
            QuestionInput::Emoji { .. } => InputKind::Emoji,
            QuestionInput::Slider { .. } => InputKind::Slider,
        }
    }

    pub fn options(&self) -> &[QuestionOption] {
        match self {
            QuestionInput::Choice { options } | QuestionInput::Emoji { options } => options,
            QuestionInput::Slider { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: QuestionNumber,
    pub prompt: String,
    pub input: QuestionInput,
}

/// Non-empty, sequentially numbered list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct RawQuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        validate(&questions)?;
        Ok(Self { questions })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, QuestionBankError> {
        let parsed: RawQuestionBank = serde_json::from_str(raw)?;
        Self::new(parsed.questions)
    }

    pub fn from_path(path: &Path) -> Result<Self, QuestionBankError> {
        let raw = fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Customer-feedback survey used when no bank file is supplied.
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                choice(
                    1,
                    "How satisfied are you with our service overall?",
                    &[
                        ("Very satisfied", "very-satisfied", "5"),
                        ("Satisfied", "satisfied", "4"),
                        ("Neutral", "neutral", "3"),
                        ("Dissatisfied", "dissatisfied", "1"),
                    ],
                ),
                emoji(
                    2,
                    "How did your last visit make you feel?",
                    &[
                        ("😄", "delighted", "5"),
                        ("🙂", "happy", "4"),
                        ("😐", "indifferent", "2"),
                        ("😞", "unhappy", "0"),
                    ],
                ),
                Question {
                    number: QuestionNumber(3),
                    prompt: "How likely are you to recommend us to a friend?".into(),
                    input: QuestionInput::Slider { min: 0, max: 10 },
                },
                choice(
                    4,
                    "How often do you use our product?",
                    &[
                        ("Every day", "daily", "4"),
                        ("A few times a week", "weekly", "3"),
                        ("A few times a month", "monthly", "2"),
                        ("Rarely", "rarely", "1"),
                    ],
                ),
                emoji(
                    5,
                    "How was the checkout experience?",
                    &[
                        ("🤩", "excellent", "5"),
                        ("👍", "good", "3"),
                        ("👎", "poor", "1"),
                    ],
                ),
            ],
        }
    }
}

fn choice(number: u32, prompt: &str, options: &[(&str, &str, &str)]) -> Question {
    Question {
        number: QuestionNumber(number),
        prompt: prompt.into(),
        input: QuestionInput::Choice {
            options: option_list(options),
        },
    }
}

fn emoji(number: u32, prompt: &str, options: &[(&str, &str, &str)]) -> Question {
    Question {
        number: QuestionNumber(number),
        prompt: prompt.into(),
        input: QuestionInput::Emoji {
            options: option_list(options),
        },
    }
}

fn option_list(options: &[(&str, &str, &str)]) -> Vec<QuestionOption> {
    options
        .iter()
        .map(|(label, value, points)| QuestionOption {
            label: (*label).into(),
            value: (*value).into(),
            points: Some((*points).into()),
        })
        .collect()
}

fn validate(questions: &[Question]) -> Result<(), QuestionBankError> {
    if questions.is_empty() {
        return Err(QuestionBankError::Empty);
    }

    for (position, question) in questions.iter().enumerate() {
        let expected = QuestionNumber::from_index(position);
        if question.number != expected {
            return Err(QuestionBankError::NonSequentialNumber {
                position,
                expected: expected.0,
                found: question.number.0,
            });
        }

        let number = question.number.0;
        match &question.input {
            QuestionInput::Choice { options } | QuestionInput::Emoji { options } => {
                if options.is_empty() {
                    return Err(QuestionBankError::NoOptions { number });
                }
                let mut seen = HashSet::new();
                for option in options {
                    if option.value.is_empty() {
                        return Err(QuestionBankError::EmptyOptionValue { number });
                    }
                    if !seen.insert(option.value.as_str()) {
                        return Err(QuestionBankError::DuplicateOption {
                            number,
                            value: option.value.clone(),
                        });
                    }
                }
            }
            QuestionInput::Slider { min, max } => {
                if min > max {
                    return Err(QuestionBankError::EmptySliderRange {
                        number,
                        min: *min,
                        max: *max,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Accepts option points written either as a JSON number or a string.
/// Anything else is treated as absent.
fn raw_points<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(raw)) => Some(raw),
        Some(serde_json::Value::Number(raw)) => Some(raw.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_is_valid() {
        let bank = QuestionBank::builtin();
        validate(bank.questions()).expect("builtin bank validates");
        assert_eq!(bank.len(), 5);
    }

    #[test]
    fn loads_bank_from_json() {
        let bank = QuestionBank::from_json_str(
            r#"{
                "questions": [
                    {
                        "number": 1,
                        "prompt": "Pick one",
                        "input": {
                            "kind": "choice",
                            "options": [
                                { "label": "A", "value": "a", "points": 5 },
                                { "label": "B", "value": "b", "points": "2" },
                                { "label": "C", "value": "c" }
                            ]
                        }
                    },
                    {
                        "number": 2,
                        "prompt": "Slide",
                        "input": { "kind": "slider", "min": 0, "max": 5 }
                    }
                ]
            }"#,
        )
        .expect("bank");

        let options = bank.get(0).expect("q1").input.options();
        assert_eq!(options[0].points(), 5);
        assert_eq!(options[1].points(), 2);
        assert_eq!(options[2].points(), 0);
        assert_eq!(bank.get(1).expect("q2").input.kind(), InputKind::Slider);
    }

    #[test]
    fn rejects_empty_bank() {
        let err = QuestionBank::from_json_str(r#"{ "questions": [] }"#).expect_err("empty");
        assert!(matches!(err, QuestionBankError::Empty));
    }

    #[test]
    fn rejects_gaps_in_numbering() {
        let mut questions = QuestionBank::builtin().questions().to_vec();
        questions.remove(1);
        let err = QuestionBank::new(questions).expect_err("gap");
        assert!(matches!(
            err,
            QuestionBankError::NonSequentialNumber {
                position: 1,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn rejects_duplicate_option_values() {
        let question = choice(1, "Dup", &[("A", "same", "1"), ("B", "same", "2")]);
        let err = QuestionBank::new(vec![question]).expect_err("duplicate");
        assert!(matches!(err, QuestionBankError::DuplicateOption { number: 1, .. }));
    }

    #[test]
    fn rejects_inverted_slider_range() {
        let question = Question {
            number: QuestionNumber(1),
            prompt: "Backwards".into(),
            input: QuestionInput::Slider { min: 5, max: 1 },
        };
        let err = QuestionBank::new(vec![question]).expect_err("range");
        assert!(matches!(err, QuestionBankError::EmptySliderRange { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = QuestionBank::from_path(Path::new("/definitely/not/here.json"))
            .expect_err("missing");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
