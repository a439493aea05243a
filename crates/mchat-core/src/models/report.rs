use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::patient::PatientInfo;
use super::result::ScreeningResult;

/// Everything the export and print collaborators need to render a result.
/// Field names are addressable from the report template.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningReport {
    pub id: Uuid,
    pub instrument_name: String,
    pub patient: PatientInfo,
    pub age_in_months: u32,
    pub result: ScreeningResult,
    pub question_count: u8,
    pub failed_questions: Vec<FailedQuestion>,
    /// Generated analysis, or the fallback notice when generation failed.
    pub analysis: Option<String>,
    /// Set when the child's age is outside the instrument's intended range.
    pub age_warning: Option<String>,
    pub generated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FailedQuestion {
    pub id: u8,
    pub text: String,
}

/// Status of the generated analysis attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
#[ts(export)]
pub enum AnalysisStatus {
    NotRequested,
    Generating,
    Complete(String),
    Failed(String),
}

impl AnalysisStatus {
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisStatus::Complete(text) | AnalysisStatus::Failed(text) => Some(text),
            AnalysisStatus::NotRequested | AnalysisStatus::Generating => None,
        }
    }
}
