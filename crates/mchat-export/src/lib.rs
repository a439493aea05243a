//! mchat-export
//!
//! Report rendering (Tera), PDF and DOCX generation, and plain-text printing.

pub mod docx;
pub mod error;
pub mod markdown;
pub mod pdf;
pub mod print;
pub mod render;
pub mod styles;

use std::path::{Path, PathBuf};

use mchat_core::models::report::ScreeningReport;

use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Shown when a PDF export fails; points the user at the print path.
pub const EXPORT_FAILURE_NOTICE: &str =
    "Could not create the PDF. Use the print option and save the output as PDF instead.";

/// Shown when a DOCX export fails.
pub const DOCX_EXPORT_FAILURE_NOTICE: &str =
    "Could not create the DOCX. Use the print option and save the output instead.";

/// Render `report` and write it as a PDF into `dir`. Returns the file path.
pub fn export_pdf(
    report: &ScreeningReport,
    styles: &DocumentStyles,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let rendered = render::render_report(report, None)?;
    let title = format!("{} screening report", report.instrument_name);
    let bytes = pdf::generate_pdf(&title, &rendered, styles)?;
    let file_name = styles::file_name(&report.patient.child_name, "pdf");
    write_export(&bytes, dir, &file_name)
}

/// Render `report` and write it as a DOCX into `dir`. Returns the file path.
pub fn export_docx(
    report: &ScreeningReport,
    styles: &DocumentStyles,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let rendered = render::render_report(report, None)?;
    let bytes = docx::generate_docx(&rendered, styles)?;
    let file_name = styles::file_name(&report.patient.child_name, "docx");
    write_export(&bytes, dir, &file_name)
}

/// Write `bytes` to `dir/file_name` via a temp file and rename.
pub fn write_export(bytes: &[u8], dir: &Path, file_name: &str) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let tmp_path = dir.join(format!("{file_name}.tmp"));
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, &path)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "report exported");
    Ok(path)
}
