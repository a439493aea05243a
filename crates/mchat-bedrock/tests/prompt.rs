use jiff::civil::date;
use mchat_bedrock::prompt::build_prompt;
use mchat_core::models::answer::{Answer, AnswerSheet};
use mchat_core::models::patient::PatientInfo;
use mchat_instruments::Instrument;
use mchat_instruments::instruments::mchat_r::MChatR;

fn safe_sheet() -> AnswerSheet {
    let mut sheet = AnswerSheet::new();
    for q in MChatR.questions() {
        sheet.set(q.id, q.passing_answer()).unwrap();
    }
    sheet
}

#[test]
fn prompt_includes_score_risk_and_failed_items() {
    let mut patient = PatientInfo::new(date(2024, 3, 10));
    patient.child_name = "Minh An".to_string();
    patient.birth_date = Some(date(2022, 1, 15));

    let mut sheet = safe_sheet();
    sheet.set(2, Answer::Yes).unwrap();
    sheet.set(13, Answer::No).unwrap();
    sheet.set(14, Answer::No).unwrap();
    let result = MChatR.score(&sheet);

    let prompt = build_prompt(&MChatR, &patient, &result);
    assert!(prompt.contains("- Name: Minh An"));
    assert!(prompt.contains("- Home name: Unknown"));
    assert!(prompt.contains("- Age: 25 months"));
    assert!(prompt.contains("<result>\n## M-CHAT-R\n"));
    assert!(prompt.contains("- Score: 3/20"));
    assert!(prompt.contains("- Risk level: MEDIUM RISK"));
    assert!(prompt.contains("- Question 2: Have you ever wondered if your child might be deaf?"));
    assert!(prompt.contains("- Question 13: Does your child walk?"));
    assert!(prompt.contains("4. **Suggested next steps**"));
}

#[test]
fn prompt_without_failures_says_none() {
    let patient = PatientInfo::new(date(2024, 3, 10));
    let result = MChatR.score(&safe_sheet());
    let prompt = build_prompt(&MChatR, &patient, &result);
    assert!(prompt.contains("### Items indicating risk\nNone.\n</result>"));
    assert!(prompt.contains("- Age: 0 months"));
    assert!(prompt.contains("LOW RISK"));
}
