//! PDF generation with the built-in fonts or an embedded TrueType font.
//!
//! Layout is a single text column. Each block (heading, list item,
//! paragraph) is wrapped to the content width and kept together on one
//! page; a block only splits across pages when it is taller than a whole
//! page. A horizontal rule becomes extra vertical space.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::ExportError;
use crate::markdown::{Block, parse_blocks, plain_text};
use crate::styles::DocumentStyles;

/// Approximate Helvetica advance width as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;
const PT_TO_MM: f32 = 0.352_778;
const LINE_SPACING: f32 = 1.35;
const BLOCK_GAP_MM: f32 = 2.0;
const LIST_INDENT_MM: f32 = 5.0;

struct Line {
    text: String,
    size: f32,
    bold: bool,
    indent_mm: f32,
}

impl Line {
    fn height_mm(&self) -> f32 {
        self.size * PT_TO_MM * LINE_SPACING
    }
}

/// Generate a PDF from rendered report Markdown.
pub fn generate_pdf(
    title: &str,
    rendered: &str,
    styles: &DocumentStyles,
) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        title,
        Mm(styles.page_width_mm),
        Mm(styles.page_height_mm),
        "Layer 1",
    );
    let (font, bold) = match &styles.pdf_font {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            let font = doc
                .add_external_font(bytes.as_slice())
                .map_err(|e| ExportError::Pdf(format!("font error in {}: {e}", path.display())))?;
            (font.clone(), font)
        }
        None => (
            doc.add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?,
            doc.add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?,
        ),
    };
    // Built-in fonts are WinAnsi only; an embedded font takes the text as is.
    let win_ansi = styles.pdf_font.is_none();

    let mut writer = PageWriter {
        doc: &doc,
        styles,
        layer: doc.get_page(page1).get_layer(layer1),
        y: styles.page_height_mm - styles.margin_top(),
        pages: 1,
    };

    for block in parse_blocks(rendered) {
        if block == Block::PageBreak {
            writer.new_page();
            continue;
        }
        let lines = layout_block(&block, styles, win_ansi);
        writer.write_block(&lines, &font, &bold);
    }

    tracing::debug!(pages = writer.pages, "pdf laid out");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    styles: &'a DocumentStyles,
    layer: PdfLayerReference,
    /// Baseline of the next line, in mm from the bottom edge.
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.styles.page_width_mm),
            Mm(self.styles.page_height_mm),
            "Layer 1",
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.styles.page_height_mm - self.styles.margin_top();
        self.pages += 1;
    }

    fn remaining_mm(&self) -> f32 {
        self.y - self.styles.margin_bottom()
    }

    fn page_capacity_mm(&self) -> f32 {
        self.styles.page_height_mm - self.styles.margin_top() - self.styles.margin_bottom()
    }

    fn write_block(&mut self, lines: &[Line], font: &IndirectFontRef, bold: &IndirectFontRef) {
        let height: f32 = lines.iter().map(Line::height_mm).sum();
        if height > self.remaining_mm() && height <= self.page_capacity_mm() {
            self.new_page();
        }

        for line in lines {
            if line.height_mm() > self.remaining_mm() {
                self.new_page();
            }
            self.y -= line.height_mm();
            let face = if line.bold { bold } else { font };
            self.layer.use_text(
                line.text.as_str(),
                line.size,
                Mm(self.styles.margin_left() + line.indent_mm),
                Mm(self.y),
                face,
            );
        }
        self.y -= BLOCK_GAP_MM;
    }
}

fn layout_block(block: &Block, styles: &DocumentStyles, win_ansi: bool) -> Vec<Line> {
    let (text, size, bold, indent_mm) = match block {
        Block::Heading { level, text } => {
            let size = match level {
                1 => styles.heading1_size,
                2 => styles.heading2_size,
                _ => styles.heading3_size,
            };
            (plain_text(text), size, true, 0.0)
        }
        Block::Bullet(text) => (format!("- {}", plain_text(text)), styles.body_size, false, LIST_INDENT_MM),
        Block::Numbered { number, text } => (
            format!("{number}. {}", plain_text(text)),
            styles.body_size,
            false,
            LIST_INDENT_MM,
        ),
        Block::Paragraph(text) => (plain_text(text), styles.body_size, false, 0.0),
        Block::PageBreak | Block::Rule => return Vec::new(),
    };

    let width_mm = styles.content_width_mm() - indent_mm;
    let char_mm = size * PT_TO_MM * AVG_CHAR_WIDTH;
    let max_chars = ((width_mm / char_mm).floor() as usize).max(1);

    let text = if win_ansi { to_win_ansi(&text) } else { text };
    wrap_text(&text, max_chars)
        .into_iter()
        .map(|text| Line {
            text,
            size,
            bold,
            indent_mm,
        })
        .collect()
}

/// Replace characters the built-in fonts cannot encode.
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap at `max_chars`; words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
