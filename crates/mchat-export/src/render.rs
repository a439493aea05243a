use serde::Serialize;
use tera::{Context, Tera};

use mchat_core::models::report::{FailedQuestion, ScreeningReport};

use crate::error::ExportError;

const REPORT_TEMPLATE_NAME: &str = "report.md";
const REPORT_TEMPLATE: &str = include_str!("../templates/report.md.tera");

const NOT_AVAILABLE: &str = "N/A";
const ANALYSIS_PENDING: &str = "The analysis has not been generated.";

/// Display-ready view of a report. Every field is addressable by name in
/// the template.
#[derive(Debug, Serialize)]
struct ReportView<'a> {
    instrument_name: &'a str,
    child_name: &'a str,
    home_name: &'a str,
    birth_date: String,
    age_in_months: u32,
    test_date: String,
    examiner_name: &'a str,
    examiner_position: &'static str,
    age_warning: Option<&'a str>,
    total_score: u8,
    question_count: u8,
    risk_label: &'static str,
    guidance: &'static str,
    failed_questions: &'a [FailedQuestion],
    analysis: &'a str,
    report_date: String,
}

impl<'a> ReportView<'a> {
    fn new(report: &'a ScreeningReport) -> Self {
        let patient = &report.patient;
        Self {
            instrument_name: &report.instrument_name,
            child_name: or_na(&patient.child_name),
            home_name: or_na(&patient.home_name),
            birth_date: patient
                .birth_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            age_in_months: report.age_in_months,
            test_date: patient.test_date.to_string(),
            examiner_name: or_na(&patient.examiner_name),
            examiner_position: patient.examiner_position.label(),
            age_warning: report.age_warning.as_deref(),
            total_score: report.result.total_score,
            question_count: report.question_count,
            risk_label: report.result.risk_level.label(),
            guidance: report.result.risk_level.guidance(),
            failed_questions: &report.failed_questions,
            analysis: report.analysis.as_deref().unwrap_or(ANALYSIS_PENDING),
            report_date: report.generated_at.strftime("%Y-%m-%d").to_string(),
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { NOT_AVAILABLE } else { value }
}

/// Render a report to Markdown.
///
/// `template_content` overrides the built-in template (Jinja2 syntax).
pub fn render_report(
    report: &ScreeningReport,
    template_content: Option<&str>,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    tera.add_raw_template(
        REPORT_TEMPLATE_NAME,
        template_content.unwrap_or(REPORT_TEMPLATE),
    )
    .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let context = Context::from_serialize(ReportView::new(report))?;
    let rendered = tera.render(REPORT_TEMPLATE_NAME, &context)?;
    Ok(rendered)
}
