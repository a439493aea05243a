use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("unknown question {question_id} for instrument '{instrument_id}'")]
    UnknownQuestion {
        instrument_id: String,
        question_id: u8,
    },

    #[error(transparent)]
    Core(#[from] mchat_core::error::CoreError),
}
