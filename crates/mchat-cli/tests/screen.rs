use std::sync::Arc;

use mchat_bedrock::error::BedrockError;
use mchat_bedrock::generate::{Generation, TextGenerator};
use mchat_cli::screen::{Event, Screen};
use mchat_cli::session::{ScreeningSession, View};
use mchat_core::models::patient::{ExaminerPosition, PatientInfo};
use mchat_core::models::report::AnalysisStatus;
use mchat_core::models::token_count::TokenCount;
use mchat_export::{DOCX_EXPORT_FAILURE_NOTICE, EXPORT_FAILURE_NOTICE};
use mchat_instruments::Instrument;
use mchat_instruments::instruments::mchat_r::MChatR;
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

/// Answers with the prompt it was given.
struct EchoPrompt;

impl TextGenerator for EchoPrompt {
    async fn generate(&self, prompt: &str) -> Result<Generation, BedrockError> {
        Ok(Generation {
            id: Uuid::new_v4(),
            model_id: "test-model".to_string(),
            text: prompt.to_string(),
            usage: TokenCount::default(),
        })
    }
}

/// Never answers until released.
struct Stalled(Arc<Notify>);

impl TextGenerator for Stalled {
    async fn generate(&self, _prompt: &str) -> Result<Generation, BedrockError> {
        self.0.notified().await;
        Err(BedrockError::Invocation("released".to_string()))
    }
}

fn session() -> ScreeningSession {
    let mut patient = PatientInfo::new(jiff::civil::date(2024, 3, 10));
    patient.examiner_name = "Lan".to_string();
    ScreeningSession::new(Box::new(MChatR), patient)
}

fn scripted(lines: &[String]) -> (UnboundedSender<Event>, UnboundedReceiver<Event>) {
    let (tx, rx) = unbounded_channel();
    for line in lines {
        tx.send(Event::Line(line.clone())).unwrap();
    }
    tx.send(Event::InputClosed).unwrap();
    (tx, rx)
}

fn patient_lines() -> Vec<String> {
    ["", "Minh An", "Sunflower", "2022-01-15", "", "specialist"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn answer_lines(risky: &[u8]) -> Vec<String> {
    MChatR
        .questions()
        .iter()
        .map(|q| {
            let answer = if risky.contains(&q.id) {
                q.failing_answer()
            } else {
                q.passing_answer()
            };
            answer.to_string().to_lowercase()
        })
        .collect()
}

fn script(parts: &[Vec<String>]) -> Vec<String> {
    parts.iter().flatten().cloned().collect()
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn full_run_without_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let lines = script(&[patient_lines(), answer_lines(&[2, 5, 12]), words(&["p", "f", "q"])]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        dir.path().to_path_buf(),
    );
    let (session, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(session.view(), View::Result);
    assert_eq!(session.result().total_score, 3);
    assert_eq!(session.analysis(), &AnalysisStatus::NotRequested);
    assert_eq!(session.patient().child_name, "Minh An");
    assert_eq!(session.patient().examiner_name, "Lan");
    assert_eq!(session.patient().examiner_position, ExaminerPosition::Specialist);

    assert!(out.contains("Age: 25 months"));
    assert!(out.contains("Score: 3/20  MEDIUM RISK"));
    assert!(out.contains("Question 12:"));
    assert!(dir.path().join("MCHAT_R_Minh An.pdf").exists());
}

#[tokio::test]
async fn invalid_input_is_reprompted() {
    let lines = script(&[
        words(&["", "", "", "not a date", "", "", "janitor", ""]),
        words(&["maybe", "-"]),
        answer_lines(&[]),
        words(&["q"]),
    ]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("Invalid date"));
    assert!(out.contains("Unknown position: janitor"));
    assert_eq!(out.matches("Please answer y or n.").count(), 2);
    assert_eq!(session.patient().birth_date, None);
    assert_eq!(session.patient().examiner_position, ExaminerPosition::Teacher);
    assert_eq!(session.result().total_score, 0);
}

#[tokio::test]
async fn print_is_rejected_while_generating() {
    let gate = Arc::new(Notify::new());
    let lines = script(&[patient_lines(), answer_lines(&[]), words(&["p", "q"])]);

    let screen = Screen::new(
        session(),
        Some(Arc::new(Stalled(gate.clone()))),
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(session.is_generating());
    assert!(out.contains("Generating analysis..."));
    assert!(out.contains("still being generated"));
    assert!(!out.contains("Screening Report"));
}

#[tokio::test]
async fn waiting_applies_the_analysis() {
    let lines = script(&[patient_lines(), answer_lines(&[1]), words(&["w", "p", "q"])]);

    let screen = Screen::new(
        session(),
        Some(Arc::new(EchoPrompt)),
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    let AnalysisStatus::Complete(text) = session.analysis() else {
        panic!("analysis not applied: {:?}", session.analysis());
    };
    assert!(text.contains("Score: 1/20"));
    assert!(out.contains("--- Analysis ---"));
    assert!(out.contains("Screening Report"));
}

#[tokio::test]
async fn late_analysis_after_reset_is_discarded() {
    let lines = script(&[
        patient_lines(),
        answer_lines(&[]),
        words(&["r"]),
        answer_lines(&[1, 2, 3, 4, 5, 6, 7, 8]),
        words(&["w", "q"]),
    ]);

    let screen = Screen::new(
        session(),
        Some(Arc::new(EchoPrompt)),
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, _) = screen.run().await.unwrap();

    assert_eq!(session.version(), 1);
    assert_eq!(session.result().total_score, 8);
    let text = session.analysis().text().expect("analysis");
    assert!(text.contains("Score: 8/20"));
    assert!(!text.contains("Score: 0/20"));
}

#[tokio::test]
async fn closed_input_ends_the_run() {
    let lines = words(&["", "Minh An"]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, _) = screen.run().await.unwrap();
    assert_eq!(session.view(), View::Answering);
    assert_eq!(session.patient().child_name, "");
}

#[tokio::test]
async fn entered_test_date_drives_the_age() {
    let lines = script(&[
        words(&["20/08/2024", "2024-08-20", "Minh An", "", "2022-01-15", "", ""]),
        answer_lines(&[]),
        words(&["q"]),
    ]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("Test date (YYYY-MM-DD, blank for today) [2024-03-10]: "));
    assert!(out.contains("Invalid date"));
    assert!(out.contains("Age: 31 months"));
    assert!(out.contains("Note: M-CHAT-R is intended for children aged 16-30 months"));
    assert_eq!(session.patient().test_date, jiff::civil::date(2024, 8, 20));

    let report = session.report().unwrap();
    assert_eq!(report.age_in_months, 31);
    assert!(report.age_warning.is_some());
}

#[tokio::test]
async fn blank_test_date_keeps_the_default() {
    let lines = script(&[patient_lines(), answer_lines(&[]), words(&["q"])]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        std::env::temp_dir(),
    );
    let (session, _) = screen.run().await.unwrap();
    assert_eq!(session.patient().test_date, jiff::civil::date(2024, 3, 10));
    assert_eq!(session.report().unwrap().age_in_months, 25);
}

#[tokio::test]
async fn failed_exports_name_their_format() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, b"file").unwrap();
    let lines = script(&[patient_lines(), answer_lines(&[]), words(&["d", "f", "q"])]);

    let screen = Screen::new(
        session(),
        None::<Arc<EchoPrompt>>,
        scripted(&lines),
        Vec::new(),
        not_a_dir,
    );
    let (_, out) = screen.run().await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches(DOCX_EXPORT_FAILURE_NOTICE).count(), 1);
    assert_eq!(out.matches(EXPORT_FAILURE_NOTICE).count(), 1);
    assert_eq!(out.matches("Could not create the PDF").count(), 1);
}
