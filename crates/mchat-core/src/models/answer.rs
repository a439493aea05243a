use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::QUESTION_COUNT;
use crate::error::CoreError;

/// A caregiver's response to a single item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Answer {
    Yes,
    No,
    #[default]
    Unanswered,
}

impl Answer {
    pub fn is_answered(self) -> bool {
        self != Answer::Unanswered
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value { Answer::Yes } else { Answer::No }
    }
}

impl From<Option<bool>> for Answer {
    fn from(value: Option<bool>) -> Self {
        value.map(Answer::from).unwrap_or_default()
    }
}

impl FromStr for Answer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Answer::Yes),
            "n" | "no" => Ok(Answer::No),
            "" | "-" | "unanswered" => Ok(Answer::Unanswered),
            other => Err(CoreError::InvalidAnswer(other.to_string())),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
            Answer::Unanswered => "-",
        };
        f.write_str(label)
    }
}

/// The full set of answers for one screening, one slot per question id.
///
/// Backed by a fixed array so the key set can never grow or shrink. Writes
/// to an id outside `1..=20` are rejected; reads of such an id return
/// [`Answer::Unanswered`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerSheet {
    answers: [Answer; QUESTION_COUNT],
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer recorded for `id`; `Unanswered` for unknown ids.
    pub fn get(&self, id: u8) -> Answer {
        slot(id)
            .and_then(|i| self.answers.get(i).copied())
            .unwrap_or_default()
    }

    pub fn set(&mut self, id: u8, answer: Answer) -> Result<(), CoreError> {
        let index = slot(id).ok_or(CoreError::UnknownQuestion(id))?;
        self.answers[index] = answer;
        Ok(())
    }

    /// Reset every slot to `Unanswered`.
    pub fn clear(&mut self) {
        self.answers = [Answer::Unanswered; QUESTION_COUNT];
    }

    /// `(id, answer)` pairs in question order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Answer)> + '_ {
        self.answers
            .iter()
            .enumerate()
            .map(|(i, answer)| (i as u8 + 1, *answer))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_answered()).count()
    }
}

impl From<[Answer; QUESTION_COUNT]> for AnswerSheet {
    fn from(answers: [Answer; QUESTION_COUNT]) -> Self {
        Self { answers }
    }
}

fn slot(id: u8) -> Option<usize> {
    let index = usize::from(id).checked_sub(1)?;
    (index < QUESTION_COUNT).then_some(index)
}
