//! Interactive screening over a line-oriented terminal.
//!
//! Input lines and generation outcomes arrive on one channel and are handled
//! in order by a single task, so the session has exactly one writer.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;
use mchat_bedrock::error::BedrockError;
use mchat_bedrock::generate::{Generation, TextGenerator};
use mchat_core::models::answer::Answer;
use mchat_core::models::patient::ExaminerPosition;
use mchat_core::models::report::AnalysisStatus;
use mchat_export::styles::DocumentStyles;
use mchat_export::{
    DOCX_EXPORT_FAILURE_NOTICE, EXPORT_FAILURE_NOTICE, export_docx, export_pdf, print, render,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::warn;

use crate::session::{GenerationTicket, ScreeningSession, SessionError};

#[derive(Debug)]
pub enum Event {
    Line(String),
    Analysis(GenerationTicket, Result<Generation, BedrockError>),
    InputClosed,
}

enum MenuExit {
    Reset,
    Quit,
}

/// Forward stdin lines into an event channel from a blocking thread.
pub fn stdin_events() -> (UnboundedSender<Event>, UnboundedReceiver<Event>) {
    let (tx, rx) = unbounded_channel();
    let input_tx = tx.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Event::InputClosed);
    });
    (tx, rx)
}

pub struct Screen<G, W> {
    session: ScreeningSession,
    generator: Option<Arc<G>>,
    events_tx: UnboundedSender<Event>,
    events: UnboundedReceiver<Event>,
    pending: VecDeque<String>,
    input_closed: bool,
    out: W,
    styles: DocumentStyles,
    output_dir: PathBuf,
}

impl<G, W> Screen<G, W>
where
    G: TextGenerator + 'static,
    W: Write,
{
    pub fn new(
        session: ScreeningSession,
        generator: Option<Arc<G>>,
        (events_tx, events): (UnboundedSender<Event>, UnboundedReceiver<Event>),
        out: W,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            generator,
            events_tx,
            events,
            pending: VecDeque::new(),
            input_closed: false,
            out,
            styles: DocumentStyles::default(),
            output_dir,
        }
    }

    /// Page and font settings for PDF and DOCX exports.
    pub fn with_styles(mut self, styles: DocumentStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Run until the user quits or input ends. Hands back the session and
    /// the output sink.
    pub async fn run(mut self) -> Result<(ScreeningSession, W)> {
        let instructions = self.session.instrument().instructions().to_string();
        writeln!(self.out, "{}\n\n{instructions}\n", self.session.instrument().name())?;

        if self.collect_patient().await? {
            loop {
                if !self.collect_answers().await? {
                    break;
                }
                self.show_result()?;
                match self.result_menu().await? {
                    MenuExit::Reset => continue,
                    MenuExit::Quit => break,
                }
            }
        }

        Ok((self.session, self.out))
    }

    async fn next_event(&mut self) -> Option<Event> {
        if self.input_closed {
            // Only generation outcomes can still arrive.
            return None;
        }
        self.events.recv().await
    }

    /// Next input line. Generation outcomes received meanwhile are applied.
    async fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }
        while let Some(event) = self.next_event().await {
            match event {
                Event::Line(line) => return Ok(Some(line)),
                Event::Analysis(ticket, outcome) => self.on_analysis(&ticket, outcome)?,
                Event::InputClosed => self.input_closed = true,
            }
        }
        Ok(None)
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(self.next_line().await?.map(|line| line.trim().to_string()))
    }

    async fn collect_patient(&mut self) -> Result<bool> {
        let default_test_date = self.session.patient().test_date;
        let test_date = loop {
            let label = format!("Test date (YYYY-MM-DD, blank for today) [{default_test_date}]: ");
            let Some(input) = self.prompt(&label).await? else {
                return Ok(false);
            };
            if input.is_empty() {
                break default_test_date;
            }
            match input.parse::<jiff::civil::Date>() {
                Ok(date) => break date,
                Err(e) => writeln!(self.out, "Invalid date: {e}")?,
            }
        };

        let Some(child_name) = self.prompt("Child name: ").await? else {
            return Ok(false);
        };
        let Some(home_name) = self.prompt("Home name: ").await? else {
            return Ok(false);
        };

        let birth_date = loop {
            let Some(input) = self.prompt("Birth date (YYYY-MM-DD, blank to skip): ").await?
            else {
                return Ok(false);
            };
            if input.is_empty() {
                break None;
            }
            match input.parse::<jiff::civil::Date>() {
                Ok(date) => break Some(date),
                Err(e) => writeln!(self.out, "Invalid date: {e}")?,
            }
        };

        let default_examiner = self.session.patient().examiner_name.clone();
        let label = if default_examiner.is_empty() {
            "Examiner name: ".to_string()
        } else {
            format!("Examiner name [{default_examiner}]: ")
        };
        let Some(examiner_name) = self.prompt(&label).await? else {
            return Ok(false);
        };

        let default_position = self.session.patient().examiner_position;
        let keys: Vec<&str> = ExaminerPosition::ALL.iter().map(|p| p.key()).collect();
        let examiner_position = loop {
            let label = format!(
                "Examiner position ({}) [{}]: ",
                keys.join("/"),
                default_position.key()
            );
            let Some(input) = self.prompt(&label).await? else {
                return Ok(false);
            };
            if input.is_empty() {
                break default_position;
            }
            match input.parse::<ExaminerPosition>() {
                Ok(position) => break position,
                Err(_) => writeln!(self.out, "Unknown position: {input}")?,
            }
        };

        let patient = self.session.patient_mut()?;
        patient.test_date = test_date;
        patient.child_name = child_name;
        patient.home_name = home_name;
        patient.birth_date = birth_date;
        if !examiner_name.is_empty() {
            patient.examiner_name = examiner_name;
        }
        patient.examiner_position = examiner_position;

        if birth_date.is_some() {
            let age = self.session.patient().age_in_months();
            writeln!(self.out, "Age: {age} months")?;
            if let Some(warning) = self.session.instrument().age_warning(age) {
                writeln!(self.out, "Note: {warning}")?;
            }
        }
        writeln!(self.out)?;
        Ok(true)
    }

    async fn collect_answers(&mut self) -> Result<bool> {
        let questions = self.session.instrument().questions().to_vec();
        let total = questions.len();

        for question in questions {
            writeln!(self.out, "{}/{total}. {}", question.id, question.text)?;
            if let Some(example) = question.example {
                writeln!(self.out, "   ({example})")?;
            }
            loop {
                let Some(input) = self.prompt("[y/n] > ").await? else {
                    return Ok(false);
                };
                match input.parse::<Answer>() {
                    Ok(answer) if answer.is_answered() => {
                        self.session.set_answer(question.id, answer)?;
                        break;
                    }
                    _ => writeln!(self.out, "Please answer y or n.")?,
                }
            }
        }
        writeln!(self.out)?;
        Ok(true)
    }

    fn show_result(&mut self) -> Result<()> {
        let ticket = self.session.show_result(self.generator.is_some())?;
        let result = self.session.result();
        let total = self.session.instrument().questions().len();

        writeln!(
            self.out,
            "Score: {}/{total}  {}",
            result.total_score,
            result.risk_level.label()
        )?;
        writeln!(self.out, "{}", result.risk_level.guidance())?;
        let failed = self.session.instrument().failed_questions(&result);
        if !failed.is_empty() {
            writeln!(self.out, "Items indicating risk:")?;
            for q in failed {
                writeln!(self.out, "  - Question {}: {}", q.id, q.text)?;
            }
        }

        if let (Some(ticket), Some(generator)) = (ticket, self.generator.clone()) {
            writeln!(self.out, "Generating analysis...")?;
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                let outcome = generator.generate(&ticket.prompt).await;
                let _ = tx.send(Event::Analysis(ticket, outcome));
            });
        }
        Ok(())
    }

    fn on_analysis(
        &mut self,
        ticket: &GenerationTicket,
        outcome: Result<Generation, BedrockError>,
    ) -> Result<()> {
        if !self.session.apply_generation(ticket, outcome) {
            return Ok(());
        }
        if let Some(text) = self.session.analysis().text() {
            writeln!(self.out, "\n--- Analysis ---\n{text}\n----------------")?;
        }
        Ok(())
    }

    /// Block until the outstanding analysis arrives. Lines typed meanwhile
    /// are kept for later.
    async fn wait_for_analysis(&mut self) -> Result<()> {
        while self.session.is_generating() {
            let Some(event) = self.events.recv().await else {
                break;
            };
            match event {
                Event::Line(line) => self.pending.push_back(line),
                Event::Analysis(ticket, outcome) => self.on_analysis(&ticket, outcome)?,
                Event::InputClosed => self.input_closed = true,
            }
        }
        Ok(())
    }

    async fn result_menu(&mut self) -> Result<MenuExit> {
        loop {
            let Some(action) = self
                .prompt("\n[p]rint  [f] PDF  [d] DOCX  [w]ait for analysis  [r]eset  [q]uit > ")
                .await?
            else {
                return Ok(MenuExit::Quit);
            };

            match action.to_ascii_lowercase().as_str() {
                "p" | "print" => self.print()?,
                "f" | "pdf" => self.export(ExportKind::Pdf)?,
                "d" | "docx" => self.export(ExportKind::Docx)?,
                "w" | "wait" => {
                    if self.session.analysis() == &AnalysisStatus::NotRequested {
                        writeln!(self.out, "No analysis was requested.")?;
                    }
                    self.wait_for_analysis().await?;
                }
                "r" | "reset" => {
                    self.session.reset();
                    writeln!(self.out)?;
                    return Ok(MenuExit::Reset);
                }
                "q" | "quit" => return Ok(MenuExit::Quit),
                other => writeln!(self.out, "Unknown action: {other}")?,
            }
        }
    }

    fn print(&mut self) -> Result<()> {
        let report = match self.session.report() {
            Ok(report) => report,
            Err(e) => return self.rejected(e),
        };
        let printed =
            render::render_report(&report, None).and_then(|md| print::print_report(&md, &mut self.out));
        if let Err(e) = printed {
            warn!(error = %e, "print failed");
            writeln!(self.out, "Could not print the report: {e}")?;
        }
        Ok(())
    }

    fn export(&mut self, kind: ExportKind) -> Result<()> {
        let report = match self.session.report() {
            Ok(report) => report,
            Err(e) => return self.rejected(e),
        };
        let exported = match kind {
            ExportKind::Pdf => export_pdf(&report, &self.styles, &self.output_dir),
            ExportKind::Docx => export_docx(&report, &self.styles, &self.output_dir),
        };
        match exported {
            Ok(path) => writeln!(self.out, "Saved {}", path.display())?,
            Err(e) => {
                warn!(error = %e, format = ?kind, "export failed");
                let notice = match kind {
                    ExportKind::Pdf => EXPORT_FAILURE_NOTICE,
                    ExportKind::Docx => DOCX_EXPORT_FAILURE_NOTICE,
                };
                writeln!(self.out, "{notice}")?;
            }
        }
        Ok(())
    }

    fn rejected(&mut self, error: SessionError) -> Result<()> {
        match error {
            SessionError::Busy => writeln!(
                self.out,
                "The analysis is still being generated; try again shortly or choose [w]ait."
            )?,
            other => writeln!(self.out, "{other}")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum ExportKind {
    Pdf,
    Docx,
}
