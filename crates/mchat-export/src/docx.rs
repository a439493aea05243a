use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, PageMargin, Paragraph, Run, RunFonts, Style, StyleType,
};

use crate::error::ExportError;
use crate::markdown::{Block, inline_spans, parse_blocks};
use crate::styles::DocumentStyles;

/// OOXML measures page geometry in twentieths of a point.
const TWIPS_PER_MM: f32 = 56.692_9;

/// Generate a DOCX document from rendered report Markdown.
///
/// Headings map to the Heading 1–3 paragraph styles, list items keep their
/// bullet or number, a rule becomes an empty paragraph, the page-break
/// marker becomes a page break, and `**bold**` becomes a bold run.
pub fn generate_docx(rendered: &str, styles: &DocumentStyles) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .page_size(twips(styles.page_width_mm) as u32, twips(styles.page_height_mm) as u32)
        .page_margin(
            PageMargin::new()
                .top(twips(styles.margin_top()))
                .right(twips(styles.margin_right()))
                .bottom(twips(styles.margin_bottom()))
                .left(twips(styles.margin_left())),
        )
        .add_style(heading_style("Heading1", "heading 1", styles.heading1_size))
        .add_style(heading_style("Heading2", "heading 2", styles.heading2_size))
        .add_style(heading_style("Heading3", "heading 3", styles.heading3_size));

    for block in parse_blocks(rendered) {
        let paragraph = match block {
            Block::Heading { level, text } => heading_paragraph(&text, level),
            Block::Bullet(text) => list_paragraph("\u{2022} ", &text, styles),
            Block::Numbered { number, text } => list_paragraph(&format!("{number}. "), &text, styles),
            Block::Paragraph(text) => body_paragraph(&text, styles),
            Block::Rule => Paragraph::new(),
            Block::PageBreak => Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn twips(mm: f32) -> i32 {
    (mm * TWIPS_PER_MM).round() as i32
}

fn heading_style(style_id: &str, name: &str, size_pt: f32) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size((size_pt * 2.0).round() as usize) // half-points
        .bold()
}

fn heading_paragraph(text: &str, level: u8) -> Paragraph {
    let style_id = match level {
        1 => "Heading1",
        2 => "Heading2",
        _ => "Heading3",
    };
    Paragraph::new()
        .style(style_id)
        .add_run(Run::new().add_text(text.replace("**", "")))
}

fn list_paragraph(marker: &str, text: &str, styles: &DocumentStyles) -> Paragraph {
    let mut para = Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(body_run(marker, styles));
    for run in inline_runs(text, styles) {
        para = para.add_run(run);
    }
    para
}

fn body_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    let mut para = Paragraph::new().align(AlignmentType::Left);
    for run in inline_runs(text, styles) {
        para = para.add_run(run);
    }
    para
}

fn body_run(text: &str, styles: &DocumentStyles) -> Run {
    Run::new()
        .add_text(text)
        .size((styles.body_size * 2.0).round() as usize)
        .fonts(RunFonts::new().ascii(&styles.body_font))
}

fn inline_runs(text: &str, styles: &DocumentStyles) -> Vec<Run> {
    inline_spans(text)
        .into_iter()
        .map(|(segment, bold)| {
            let run = body_run(segment, styles);
            if bold { run.bold() } else { run }
        })
        .collect()
}
