//! mchat-instruments
//!
//! Screening instrument definitions. Pure data, no network or file access.
//! Defines the question table, the failure polarity of each item, and the
//! scoring and completion rules.

pub mod error;
pub mod instruments;
pub mod scoring;

use std::ops::RangeInclusive;

use mchat_core::models::answer::AnswerSheet;
use mchat_core::models::report::FailedQuestion;
use mchat_core::models::result::ScreeningResult;

use scoring::Question;

/// Trait implemented by each screening instrument.
pub trait Instrument: Send + Sync {
    /// Unique identifier for this instrument (e.g., "mchat_r").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "M-CHAT-R").
    fn name(&self) -> &str;

    /// Ages, in months, the instrument is validated for.
    fn age_range_months(&self) -> RangeInclusive<u32>;

    /// The items in presentation and scoring order.
    fn questions(&self) -> &[Question];

    /// Instructions read to the caregiver before the first item.
    fn instructions(&self) -> &str;

    /// How each answer is scored, derived from the item polarities.
    fn scoring_guide(&self) -> String {
        let special: Vec<String> = self
            .questions()
            .iter()
            .filter(|q| q.is_special)
            .map(|q| q.id.to_string())
            .collect();
        format!(
            "Items {}: \"Yes\" scores 1 point, \"No\" scores 0.\n\
             All other items: \"Yes\" scores 0 points, \"No\" scores 1.",
            special.join(", ")
        )
    }

    fn score(&self, answers: &AnswerSheet) -> ScreeningResult {
        scoring::score(answers, self.questions())
    }

    fn is_complete(&self, answers: &AnswerSheet) -> bool {
        scoring::is_complete(answers, self.questions())
    }

    fn question(&self, id: u8) -> Option<&Question> {
        self.questions().iter().find(|q| q.id == id)
    }

    /// Texts of the failed items, in question order.
    fn failed_questions(&self, result: &ScreeningResult) -> Vec<FailedQuestion> {
        result
            .failed_question_ids
            .iter()
            .filter_map(|id| self.question(*id))
            .map(|q| FailedQuestion {
                id: q.id,
                text: q.text.to_string(),
            })
            .collect()
    }

    /// A notice when `age_in_months` falls outside [`Self::age_range_months`].
    fn age_warning(&self, age_in_months: u32) -> Option<String> {
        let range = self.age_range_months();
        if range.contains(&age_in_months) {
            return None;
        }
        tracing::warn!(
            instrument = self.id(),
            age_in_months,
            "age outside the instrument's intended range"
        );
        Some(format!(
            "{} is intended for children aged {}-{} months; this child is {} months old.",
            self.name(),
            range.start(),
            range.end(),
            age_in_months,
        ))
    }

    /// Format a result as structured text for inclusion in a generation prompt.
    fn to_structured_input(&self, result: &ScreeningResult) -> String {
        let mut output = format!("## {}\n\n", self.name());
        output.push_str(&format!(
            "- Score: {}/{}\n",
            result.total_score,
            self.questions().len()
        ));
        output.push_str(&format!("- Risk level: {}\n\n", result.risk_level));
        output.push_str("### Items indicating risk\n");
        let failed = self.failed_questions(result);
        if failed.is_empty() {
            output.push_str("None.\n");
        }
        for q in failed {
            output.push_str(&format!("- Question {}: {}\n", q.id, q.text));
        }
        output
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![Box::new(instruments::mchat_r::MChatR)]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.id() == id)
}
