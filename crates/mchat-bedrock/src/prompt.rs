//! Prompt assembly for the narrative analysis.

use mchat_core::models::patient::PatientInfo;
use mchat_core::models::result::ScreeningResult;
use mchat_instruments::Instrument;

pub const SYSTEM_PROMPT: &str = "You are a senior specialist in special education and autism \
diagnosis. You write careful, professional, empathetic and constructive analyses of \
developmental screening results for parents and teachers.";

const UNKNOWN: &str = "Unknown";

/// Build the user prompt for a scored screening.
pub fn build_prompt(
    instrument: &dyn Instrument,
    patient: &PatientInfo,
    result: &ScreeningResult,
) -> String {
    let age = patient.age_in_months();

    let mut prompt = format!(
        "Based on the following {} screening result, write an in-depth analysis.\n\n",
        instrument.name()
    );

    prompt.push_str("<child>\n");
    prompt.push_str(&format!("- Name: {}\n", or_unknown(&patient.child_name)));
    prompt.push_str(&format!("- Home name: {}\n", or_unknown(&patient.home_name)));
    prompt.push_str(&format!("- Age: {age} months\n"));
    prompt.push_str("</child>\n\n");

    prompt.push_str("<result>\n");
    prompt.push_str(&instrument.to_structured_input(result));
    prompt.push_str("</result>\n\n");

    prompt.push_str(
        "Structure the answer in Markdown with exactly these sections:\n",
    );
    prompt.push_str(&format!(
        "1. **Meaning of the results**: explain a score of {} and a {} level for a child of {age} months.\n",
        result.total_score,
        result.risk_level.label().to_lowercase(),
    ));
    prompt.push_str(
        "2. **Behavioral analysis**: what the items above mean clinically for social communication development.\n",
    );
    prompt.push_str(
        "3. **Advice for parents and teachers**: concrete actions to take now at home and at school.\n",
    );
    prompt.push_str(
        "4. **Suggested next steps**: follow-up process (in-depth evaluation, early intervention, individualized education plan).\n",
    );
    prompt.push_str("\nKeep the tone professional, empathetic and clear.");

    prompt
}

fn or_unknown(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { UNKNOWN } else { trimmed }
}
