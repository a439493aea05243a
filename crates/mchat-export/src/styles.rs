use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Page geometry and typography shared by the PDF and DOCX exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    /// Font for body text in DOCX output (e.g. "Times New Roman", "Calibri").
    pub body_font: String,

    /// Body text font size in points.
    pub body_size: f32,

    /// Heading 1 font size in points.
    pub heading1_size: f32,

    /// Heading 2 font size in points.
    pub heading2_size: f32,

    /// Heading 3 font size in points.
    pub heading3_size: f32,

    /// Page width and height in millimetres (A4 portrait by default).
    pub page_width_mm: f32,
    pub page_height_mm: f32,

    /// Page margins in millimetres: top, right, bottom, left.
    pub margins_mm: [f32; 4],

    /// TrueType font embedded in PDF output. Without one the built-in
    /// Helvetica is used, which only covers Latin-1.
    #[serde(default)]
    pub pdf_font: Option<PathBuf>,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Times New Roman".to_string(),
            body_size: 10.0,
            heading1_size: 16.0,
            heading2_size: 13.0,
            heading3_size: 11.0,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margins_mm: [15.0; 4],
            pdf_font: None,
        }
    }
}

impl DocumentStyles {
    pub fn margin_top(&self) -> f32 {
        self.margins_mm[0]
    }

    pub fn margin_right(&self) -> f32 {
        self.margins_mm[1]
    }

    pub fn margin_bottom(&self) -> f32 {
        self.margins_mm[2]
    }

    pub fn margin_left(&self) -> f32 {
        self.margins_mm[3]
    }

    /// Printable width between the left and right margins.
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_left() - self.margin_right()
    }
}

const FILE_PREFIX: &str = "MCHAT_R_";
const DEFAULT_STEM: &str = "Result";

/// Export file name for a child, e.g. `MCHAT_R_Minh An.pdf`.
///
/// Falls back to `MCHAT_R_Result.{ext}` when the name is blank. Path
/// separators and other characters unsafe in file names become `_`.
pub fn file_name(child_name: &str, extension: &str) -> String {
    let trimmed = child_name.trim();
    let stem: String = if trimmed.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        trimmed
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect()
    };
    format!("{FILE_PREFIX}{stem}.{extension}")
}
