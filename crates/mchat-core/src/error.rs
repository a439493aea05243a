use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown question id: {0} (expected 1..={max})", max = crate::QUESTION_COUNT)]
    UnknownQuestion(u8),

    #[error("invalid answer: {0:?}")]
    InvalidAnswer(String),

    #[error("invalid date: {0}")]
    InvalidDate(#[from] jiff::Error),
}
