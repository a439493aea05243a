use jiff::civil::date;
use mchat_core::models::patient::PatientInfo;
use mchat_core::models::report::{FailedQuestion, ScreeningReport};
use mchat_core::models::result::ScreeningResult;
use mchat_export::markdown::{Block, inline_spans, parse_blocks};
use mchat_export::print::print_report;
use mchat_export::render::render_report;
use mchat_export::styles::{DocumentStyles, file_name};
use mchat_export::error::ExportError;
use mchat_export::{docx, export_docx, export_pdf, pdf};

fn report(child_name: &str, failed: Vec<FailedQuestion>, analysis: Option<&str>) -> ScreeningReport {
    let mut patient = PatientInfo::new(date(2024, 3, 10));
    patient.child_name = child_name.to_string();
    patient.birth_date = Some(date(2022, 1, 15));
    patient.examiner_name = "Tran Thi Lan".to_string();
    let result = ScreeningResult::from_failed(failed.iter().map(|q| q.id).collect());
    ScreeningReport {
        id: uuid::Uuid::new_v4(),
        instrument_name: "M-CHAT-R".to_string(),
        age_in_months: patient.age_in_months(),
        patient,
        result,
        question_count: 20,
        failed_questions: failed,
        analysis: analysis.map(str::to_string),
        age_warning: None,
        generated_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

fn failed(ids: &[u8]) -> Vec<FailedQuestion> {
    ids.iter()
        .map(|id| FailedQuestion {
            id: *id,
            text: format!("Item {id} text"),
        })
        .collect()
}

#[test]
fn rendered_report_contains_result() {
    let r = report("Minh An", failed(&[2, 5, 12]), Some("1. **Meaning**: medium risk"));
    let rendered = render_report(&r, None).unwrap();
    assert!(rendered.starts_with("# M-CHAT-R Screening Report"));
    assert!(rendered.contains("- **Child name:** Minh An"));
    assert!(rendered.contains("- **Home name:** N/A"));
    assert!(rendered.contains("- **Age:** 25 months"));
    assert!(rendered.contains("- **Total score:** 3/20"));
    assert!(rendered.contains("- **Risk level:** MEDIUM RISK"));
    assert!(rendered.contains("Follow-Up interview"));
    assert!(rendered.contains("- Question 5: Item 5 text"));
    assert!(rendered.contains("1. **Meaning**: medium risk"));
    assert!(rendered.contains("- **Report date:** 1970-01-01"));
    assert!(!rendered.contains("**Note:**"));
}

#[test]
fn rendered_report_without_failures_or_analysis() {
    let mut r = report("", Vec::new(), None);
    r.age_warning = Some("outside range".to_string());
    let rendered = render_report(&r, None).unwrap();
    assert!(rendered.contains("None."));
    assert!(rendered.contains("LOW RISK"));
    assert!(rendered.contains("The analysis has not been generated."));
    assert!(rendered.contains("**Note:** outside range"));
}

#[test]
fn custom_template_overrides_builtin() {
    let r = report("Minh An", failed(&[1]), None);
    let rendered = render_report(&r, Some("{{ child_name }}: {{ total_score }}")).unwrap();
    assert_eq!(rendered, "Minh An: 1");
}

#[test]
fn broken_template_is_a_parse_error() {
    let r = report("Minh An", Vec::new(), None);
    assert!(render_report(&r, Some("{% if %}")).is_err());
}

#[test]
fn file_names_default_and_sanitize() {
    assert_eq!(file_name("Minh An", "pdf"), "MCHAT_R_Minh An.pdf");
    assert_eq!(file_name("", "pdf"), "MCHAT_R_Result.pdf");
    assert_eq!(file_name("   ", "docx"), "MCHAT_R_Result.docx");
    assert_eq!(file_name("a/b", "pdf"), "MCHAT_R_a_b.pdf");
}

#[test]
fn blocks_are_parsed_by_prefix() {
    let blocks = parse_blocks(
        "# Title\n\nfirst line\nsecond line\n- item\n2. numbered\n---\n<!-- pagebreak -->\n### Sub",
    );
    assert_eq!(
        blocks,
        vec![
            Block::Heading { level: 1, text: "Title".to_string() },
            Block::Paragraph("first line second line".to_string()),
            Block::Bullet("item".to_string()),
            Block::Numbered { number: "2".to_string(), text: "numbered".to_string() },
            Block::Rule,
            Block::PageBreak,
            Block::Heading { level: 3, text: "Sub".to_string() },
        ]
    );
}

#[test]
fn inline_bold_spans() {
    assert_eq!(
        inline_spans("a **b** c"),
        vec![("a ", false), ("b", true), (" c", false)]
    );
    assert_eq!(inline_spans("open **bold"), vec![("open **bold", false)]);
}

#[test]
fn wrap_respects_width() {
    let lines = pdf::wrap_text("one two three four five six", 9);
    assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
    assert!(pdf::wrap_text("abcdefghij", 4).iter().all(|l| l.chars().count() <= 4));
}

#[test]
fn pdf_has_magic_bytes() {
    let r = report("Minh An", failed(&[2, 5, 12]), Some("Analysis text."));
    let rendered = render_report(&r, None).unwrap();
    let bytes = pdf::generate_pdf("report", &rendered, &DocumentStyles::default()).unwrap();
    assert_eq!(&bytes[0..4], b"%PDF");
}

#[test]
fn long_reports_paginate() {
    let long = "A sentence about the child's development. ".repeat(400);
    let bytes = pdf::generate_pdf("report", &long, &DocumentStyles::default()).unwrap();
    assert_eq!(&bytes[0..4], b"%PDF");
}

#[test]
fn docx_is_a_zip() {
    let r = report("Minh An", failed(&[1]), None);
    let rendered = render_report(&r, None).unwrap();
    let bytes = docx::generate_docx(&rendered, &DocumentStyles::default()).unwrap();
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn exports_write_named_files() {
    let dir = tempfile::tempdir().unwrap();
    let r = report("Minh An", failed(&[1]), None);

    let pdf_path = export_pdf(&r, &DocumentStyles::default(), dir.path()).unwrap();
    assert_eq!(pdf_path.file_name().unwrap(), "MCHAT_R_Minh An.pdf");
    assert!(pdf_path.exists());

    let docx_path = export_docx(&r, &DocumentStyles::default(), dir.path()).unwrap();
    assert_eq!(docx_path.file_name().unwrap(), "MCHAT_R_Minh An.docx");
    assert!(!dir.path().join("MCHAT_R_Minh An.pdf.tmp").exists());
}

#[test]
fn print_strips_markup() {
    let mut out = Vec::new();
    print_report("# Report\n\n- **Score:** 3\n\nDone.", &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "Report\n======\n\n  - Score: 3\n\nDone.\n\n");
}

#[test]
fn dividers_in_the_analysis_do_not_break_pages() {
    let analysis = "## Meaning\n\nFirst part.\n\n---\n\n***\n\nSecond part.";
    let r = report("Minh An", failed(&[]), Some(analysis));
    let rendered = render_report(&r, None).unwrap();

    let blocks = parse_blocks(&rendered);
    assert!(!blocks.contains(&Block::PageBreak));
    assert_eq!(blocks.iter().filter(|b| **b == Block::Rule).count(), 2);

    let mut out = Vec::new();
    print_report(&rendered, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains('\u{c}'));
    assert!(text.contains(&format!("First part.\n\n{}\n\n", "-".repeat(40))));

    let bytes = pdf::generate_pdf("report", &rendered, &DocumentStyles::default()).unwrap();
    assert_eq!(&bytes[0..4], b"%PDF");
}

#[test]
fn page_break_marker_becomes_form_feed() {
    let mut out = Vec::new();
    print_report("One.\n<!-- pagebreak -->\nTwo.", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "One.\n\n\u{c}Two.\n\n");
}

#[test]
fn missing_pdf_font_is_an_error() {
    let styles = DocumentStyles {
        pdf_font: Some("/nonexistent/fonts/NotoSans-Regular.ttf".into()),
        ..DocumentStyles::default()
    };
    let err = pdf::generate_pdf("report", "Text.", &styles).unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}

#[test]
fn embedded_font_keeps_vietnamese_names() {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    ];
    let Some(font) = candidates.iter().find(|p| std::path::Path::new(p).exists()) else {
        return;
    };
    let styles = DocumentStyles {
        pdf_font: Some(std::path::PathBuf::from(*font)),
        ..DocumentStyles::default()
    };
    let r = report("Nguyễn Thị Hằng", failed(&[2]), Some("Phân tích."));
    let rendered = render_report(&r, None).unwrap();
    let bytes = pdf::generate_pdf("report", &rendered, &styles).unwrap();
    assert_eq!(&bytes[0..4], b"%PDF");
}
