use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Risk band derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Highest score still classified as low risk.
    pub const LOW_MAX: u8 = 2;
    /// Highest score still classified as medium risk.
    pub const MEDIUM_MAX: u8 = 7;

    /// Classify a total score: 0–2 low, 3–7 medium, 8 and above high.
    pub fn from_score(total_score: u8) -> Self {
        if total_score <= Self::LOW_MAX {
            RiskLevel::Low
        } else if total_score <= Self::MEDIUM_MAX {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW RISK",
            RiskLevel::Medium => "MEDIUM RISK",
            RiskLevel::High => "HIGH RISK",
        }
    }

    /// Recommended follow-up for this band.
    pub fn guidance(self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "The child is at low risk. If the child is younger than 24 months, repeat the \
                 screening at 24 months. Continue routine developmental monitoring."
            }
            RiskLevel::Medium => {
                "The child is at medium risk. Administer the Follow-Up interview (stage 2). If \
                 the score is still 2 or more after the interview, refer the child for a \
                 specialist evaluation immediately."
            }
            RiskLevel::High => {
                "The child is at high risk. Refer the child for an in-depth diagnostic \
                 evaluation at a qualified clinical facility and enrol them in early \
                 intervention immediately."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of scoring an answer sheet. Always recomputed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningResult {
    /// Ids of questions whose answer is a risk indicator, in question order.
    pub failed_question_ids: Vec<u8>,
    pub total_score: u8,
    pub risk_level: RiskLevel,
}

impl ScreeningResult {
    pub fn from_failed(failed_question_ids: Vec<u8>) -> Self {
        let total_score = failed_question_ids.len() as u8;
        Self {
            failed_question_ids,
            total_score,
            risk_level: RiskLevel::from_score(total_score),
        }
    }
}
