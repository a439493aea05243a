use serde::Serialize;
use ts_rs::TS;

use mchat_core::models::answer::{Answer, AnswerSheet};
use mchat_core::models::result::ScreeningResult;

use crate::error::InstrumentError;

/// A single questionnaire item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: u8,
    pub text: &'static str,
    pub example: Option<&'static str>,
    /// Inverted polarity: a "Yes" answer indicates risk.
    pub is_special: bool,
}

impl Question {
    /// Whether `answer` counts as a risk indicator for this item.
    ///
    /// Ordinary items fail on "No"; special items fail on "Yes". An
    /// unanswered item never fails.
    pub fn fails(&self, answer: Answer) -> bool {
        match answer {
            Answer::Unanswered => false,
            Answer::Yes => self.is_special,
            Answer::No => !self.is_special,
        }
    }

    /// The answer that does not indicate risk.
    pub fn passing_answer(&self) -> Answer {
        if self.is_special { Answer::No } else { Answer::Yes }
    }

    /// The answer that indicates risk.
    pub fn failing_answer(&self) -> Answer {
        if self.is_special { Answer::Yes } else { Answer::No }
    }
}

/// Score an answer sheet against a question table.
///
/// Pure and total: ids missing from `answers` read as unanswered and
/// never count as failures.
pub fn score(answers: &AnswerSheet, questions: &[Question]) -> ScreeningResult {
    let failed = questions
        .iter()
        .filter(|q| q.fails(answers.get(q.id)))
        .map(|q| q.id)
        .collect();
    ScreeningResult::from_failed(failed)
}

/// True iff every question has a Yes or No answer.
pub fn is_complete(answers: &AnswerSheet, questions: &[Question]) -> bool {
    questions.iter().all(|q| answers.get(q.id).is_answered())
}

/// Build an answer sheet from `(id, answer)` pairs, rejecting ids the
/// instrument does not define.
pub fn collect_answers(
    instrument_id: &str,
    questions: &[Question],
    pairs: impl IntoIterator<Item = (u8, Answer)>,
) -> Result<AnswerSheet, InstrumentError> {
    let mut sheet = AnswerSheet::new();
    for (id, answer) in pairs {
        if !questions.iter().any(|q| q.id == id) {
            return Err(InstrumentError::UnknownQuestion {
                instrument_id: instrument_id.to_string(),
                question_id: id,
            });
        }
        sheet.set(id, answer)?;
    }
    Ok(sheet)
}
