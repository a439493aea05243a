use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use serde::Deserialize;

use mchat_bedrock::generate::TextGenerator;
use mchat_core::models::answer::Answer;
use mchat_core::models::patient::PatientInfo;
use mchat_export::styles::DocumentStyles;
use mchat_export::{
    DOCX_EXPORT_FAILURE_NOTICE, EXPORT_FAILURE_NOTICE, export_docx, export_pdf, print, render,
};
use mchat_instruments::error::InstrumentError;
use mchat_instruments::scoring::collect_answers;
use mchat_instruments::{Instrument, get_instrument};

use crate::config::{self, MchatConfig};
use crate::session::ScreeningSession;

fn default_instrument() -> String {
    "mchat_r".to_string()
}

/// Input file for non-interactive scoring.
#[derive(Debug, Deserialize)]
pub struct ScoreInput {
    #[serde(default = "default_instrument")]
    pub instrument: String,
    #[serde(default)]
    pub patient: Option<PatientInfo>,
    /// Answers keyed by question id.
    pub answers: BTreeMap<u8, Answer>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub print: bool,
    pub json: bool,
    pub pdf: bool,
    pub docx: bool,
    pub output_dir: PathBuf,
    pub styles: DocumentStyles,
}

pub fn lookup_instrument(id: &str) -> Result<Box<dyn Instrument>, InstrumentError> {
    get_instrument(id).ok_or_else(|| InstrumentError::UnknownInstrument(id.to_string()))
}

/// A blank patient record dated today, pre-filled with the configured
/// examiner.
pub fn new_patient(config: &MchatConfig) -> PatientInfo {
    let mut patient = PatientInfo::new(jiff::Zoned::now().date());
    patient.examiner_name = config.examiner_name.clone();
    patient.examiner_position = config.examiner_position;
    patient
}

pub fn questions(instrument: &dyn Instrument, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}\n\n{}\n", instrument.name(), instrument.instructions())?;
    for q in instrument.questions() {
        writeln!(out, "{:>2}. {}", q.id, q.text)?;
        if let Some(example) = q.example {
            writeln!(out, "    ({example})")?;
        }
        writeln!(out, "    risk answer: {}", q.failing_answer())?;
    }
    writeln!(out, "\n{}", instrument.scoring_guide())?;
    Ok(())
}

/// Score a prepared answer file, optionally with an analysis, and emit the
/// requested outputs.
pub async fn score<G: TextGenerator>(
    input: ScoreInput,
    config: &MchatConfig,
    generator: Option<&G>,
    options: &OutputOptions,
    out: &mut impl Write,
) -> Result<ScreeningSession> {
    let instrument = lookup_instrument(&input.instrument)?;
    let sheet = collect_answers(instrument.id(), instrument.questions(), input.answers)?;

    let missing: Vec<String> = instrument
        .questions()
        .iter()
        .filter(|q| !sheet.get(q.id).is_answered())
        .map(|q| q.id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(eyre!(
            "{} questions unanswered (ids {}); every question needs a yes or no",
            missing.len(),
            missing.join(", ")
        ));
    }

    let patient = input.patient.unwrap_or_else(|| new_patient(config));
    let mut session = ScreeningSession::new(instrument, patient);
    for (id, answer) in sheet.iter() {
        session.set_answer(id, answer)?;
    }

    if let Some(ticket) = session.show_result(generator.is_some())? {
        if let Some(generator) = generator {
            let outcome = generator.generate(&ticket.prompt).await;
            session.apply_generation(&ticket, outcome);
        }
    }

    let report = session.report()?;
    if options.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else if options.print {
        let rendered = render::render_report(&report, None)?;
        print::print_report(&rendered, out)?;
    } else {
        let result = &report.result;
        writeln!(
            out,
            "Score: {}/{}  {}",
            result.total_score,
            report.question_count,
            result.risk_level.label()
        )?;
        writeln!(out, "{}", result.risk_level.guidance())?;
        for q in &report.failed_questions {
            writeln!(out, "  - Question {}: {}", q.id, q.text)?;
        }
        if let Some(warning) = &report.age_warning {
            writeln!(out, "Note: {warning}")?;
        }
        if let Some(analysis) = &report.analysis {
            writeln!(out, "\n{analysis}")?;
        }
    }

    let styles = &options.styles;
    if options.pdf {
        match export_pdf(&report, styles, &options.output_dir) {
            Ok(path) => tracing::info!(path = %path.display(), "PDF written"),
            Err(e) => {
                tracing::warn!(error = %e, "PDF export failed");
                eprintln!("{EXPORT_FAILURE_NOTICE}");
            }
        }
    }
    if options.docx {
        match export_docx(&report, styles, &options.output_dir) {
            Ok(path) => tracing::info!(path = %path.display(), "DOCX written"),
            Err(e) => {
                tracing::warn!(error = %e, "DOCX export failed");
                eprintln!("{DOCX_EXPORT_FAILURE_NOTICE}");
            }
        }
    }

    Ok(session)
}

pub fn config_show(config: &MchatConfig, path: &Path, out: &mut impl Write) -> Result<()> {
    let info = config::config_info(config, path);
    serde_json::to_writer_pretty(&mut *out, &info)?;
    writeln!(out)?;
    Ok(())
}
