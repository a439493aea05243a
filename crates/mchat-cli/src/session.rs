//! In-memory screening session.
//!
//! Holds the answers for one child, gates the result view on completion and
//! tracks the outstanding analysis request. Every [`ScreeningSession::reset`]
//! bumps a version counter; a generation outcome is only applied when its
//! ticket carries the current version.

use mchat_bedrock::error::BedrockError;
use mchat_bedrock::generate::{Generation, resolve_analysis};
use mchat_bedrock::prompt::build_prompt;
use mchat_core::error::CoreError;
use mchat_core::models::answer::{Answer, AnswerSheet};
use mchat_core::models::patient::PatientInfo;
use mchat_core::models::report::{AnalysisStatus, ScreeningReport};
use mchat_core::models::result::ScreeningResult;
use mchat_instruments::Instrument;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{answered} of {total} questions answered; answer every question to see the result")]
    Incomplete { answered: usize, total: usize },

    #[error("answers are locked while the result is shown; reset to start again")]
    Locked,

    #[error("no result has been shown yet")]
    NoResult,

    #[error("the analysis is still being generated")]
    Busy,

    #[error("question {0} is not part of this instrument")]
    UnknownQuestion(u8),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Answering,
    Result,
}

/// Handle for one analysis request. Only valid for the session version it
/// was issued under.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    version: u64,
    pub prompt: String,
}

impl GenerationTicket {
    pub fn version(&self) -> u64 {
        self.version
    }
}

pub struct ScreeningSession {
    id: Uuid,
    instrument: Box<dyn Instrument>,
    patient: PatientInfo,
    answers: AnswerSheet,
    view: View,
    analysis: AnalysisStatus,
    version: u64,
}

impl std::fmt::Debug for ScreeningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningSession")
            .field("id", &self.id)
            .field("instrument", &self.instrument.id())
            .field("patient", &self.patient)
            .field("answers", &self.answers)
            .field("view", &self.view)
            .field("analysis", &self.analysis)
            .field("version", &self.version)
            .finish()
    }
}

impl ScreeningSession {
    pub fn new(instrument: Box<dyn Instrument>, patient: PatientInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument,
            patient,
            answers: AnswerSheet::new(),
            view: View::Answering,
            analysis: AnalysisStatus::NotRequested,
            version: 0,
        }
    }

    pub fn instrument(&self) -> &dyn Instrument {
        self.instrument.as_ref()
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn patient_mut(&mut self) -> Result<&mut PatientInfo, SessionError> {
        self.ensure_answering()?;
        Ok(&mut self.patient)
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn set_answer(&mut self, id: u8, answer: Answer) -> Result<(), SessionError> {
        self.ensure_answering()?;
        if self.instrument.question(id).is_none() {
            return Err(SessionError::UnknownQuestion(id));
        }
        self.answers.set(id, answer)?;
        Ok(())
    }

    /// Current score. Recomputed on every call.
    pub fn result(&self) -> ScreeningResult {
        self.instrument.score(&self.answers)
    }

    pub fn is_complete(&self) -> bool {
        self.instrument.is_complete(&self.answers)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn analysis(&self) -> &AnalysisStatus {
        &self.analysis
    }

    pub fn is_generating(&self) -> bool {
        self.analysis == AnalysisStatus::Generating
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Switch to the result view.
    ///
    /// With `request_analysis`, the session enters the generating state and
    /// the returned ticket carries the prompt to send.
    pub fn show_result(
        &mut self,
        request_analysis: bool,
    ) -> Result<Option<GenerationTicket>, SessionError> {
        self.ensure_answering()?;
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                answered: self.answers.answered_count(),
                total: self.instrument.questions().len(),
            });
        }

        let result = self.result();
        info!(
            session_id = %self.id,
            score = result.total_score,
            risk = ?result.risk_level,
            "screening scored"
        );
        self.view = View::Result;

        if !request_analysis {
            self.analysis = AnalysisStatus::NotRequested;
            return Ok(None);
        }

        self.analysis = AnalysisStatus::Generating;
        Ok(Some(GenerationTicket {
            version: self.version,
            prompt: build_prompt(self.instrument.as_ref(), &self.patient, &result),
        }))
    }

    /// Apply a generation outcome. Returns `false` when the ticket is stale
    /// and the outcome was discarded.
    pub fn apply_generation(
        &mut self,
        ticket: &GenerationTicket,
        outcome: Result<Generation, BedrockError>,
    ) -> bool {
        if ticket.version != self.version || !self.is_generating() {
            debug!(
                session_id = %self.id,
                ticket_version = ticket.version,
                current_version = self.version,
                "discarding stale analysis"
            );
            return false;
        }
        if let Ok(generation) = &outcome {
            info!(
                session_id = %self.id,
                generation_id = %generation.id,
                input_tokens = generation.usage.input,
                output_tokens = generation.usage.output,
                "analysis received"
            );
        }
        self.analysis = resolve_analysis(outcome);
        true
    }

    /// Clear all answers and return to the questionnaire. Patient details are
    /// kept; any outstanding ticket becomes stale.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.view = View::Answering;
        self.analysis = AnalysisStatus::NotRequested;
        self.version += 1;
        info!(session_id = %self.id, version = self.version, "session reset");
    }

    pub fn ensure_export_allowed(&self) -> Result<(), SessionError> {
        if self.view != View::Result {
            return Err(SessionError::NoResult);
        }
        if self.is_generating() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Build the report handed to the export and print collaborators.
    pub fn report(&self) -> Result<ScreeningReport, SessionError> {
        self.ensure_export_allowed()?;
        let result = self.result();
        let age_in_months = self.patient.age_in_months();
        let age_warning = self
            .patient
            .birth_date
            .and_then(|_| self.instrument.age_warning(age_in_months));

        Ok(ScreeningReport {
            id: self.id,
            instrument_name: self.instrument.name().to_string(),
            patient: self.patient.clone(),
            age_in_months,
            failed_questions: self.instrument.failed_questions(&result),
            question_count: self.instrument.questions().len() as u8,
            result,
            analysis: self.analysis.text().map(str::to_string),
            age_warning,
            generated_at: jiff::Timestamp::now(),
        })
    }

    fn ensure_answering(&self) -> Result<(), SessionError> {
        match self.view {
            View::Answering => Ok(()),
            View::Result => Err(SessionError::Locked),
        }
    }
}
