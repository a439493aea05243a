//! Block-level reading of the rendered report.
//!
//! The report template and the generated analysis use a small Markdown
//! subset:
//! - `# Heading` / `## Heading` / `### Heading` → headings, levels 1–3
//! - `- item` or `* item` → bullet item
//! - `1. item` → numbered item
//! - `---` or `***` → horizontal rule
//! - `<!-- pagebreak -->` → page break
//! - blank line → paragraph separator
//! - everything else → paragraph text; consecutive lines are joined
//!
//! Inline `**bold**` is kept in the text and split out by [`inline_spans`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet(String),
    Numbered { number: String, text: String },
    Paragraph(String),
    Rule,
    PageBreak,
}

/// Line that forces a new page in paginated output.
pub const PAGE_BREAK_MARKER: &str = "<!-- pagebreak -->";

pub fn parse_blocks(rendered: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();
        let block = if trimmed.is_empty() {
            None
        } else if let Some(text) = trimmed.strip_prefix("### ") {
            Some(heading(3, text))
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            Some(heading(2, text))
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            Some(heading(1, text))
        } else if trimmed == PAGE_BREAK_MARKER {
            Some(Block::PageBreak)
        } else if trimmed == "---" || trimmed == "***" {
            Some(Block::Rule)
        } else if let Some(text) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            Some(Block::Bullet(text.trim().to_string()))
        } else if let Some((number, text)) = numbered(trimmed) {
            Some(Block::Numbered {
                number: number.to_string(),
                text: text.to_string(),
            })
        } else {
            paragraph.push(trimmed);
            continue;
        };

        flush(&mut paragraph, &mut blocks);
        if let Some(block) = block {
            blocks.push(block);
        }
    }
    flush(&mut paragraph, &mut blocks);
    blocks
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.trim().to_string(),
    }
}

fn numbered(line: &str) -> Option<(&str, &str)> {
    let (number, rest) = line.split_once(". ")?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((number, rest.trim()))
}

fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

/// Split text into `(segment, bold)` spans on `**` markers. An unclosed
/// marker leaves the rest of the text as normal.
pub fn inline_spans(text: &str) -> Vec<(&str, bool)> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("**") {
        let before = &remaining[..start];
        let after_start = &remaining[start + 2..];
        let Some(end) = after_start.find("**") else {
            break;
        };
        if !before.is_empty() {
            spans.push((before, false));
        }
        if end > 0 {
            spans.push((&after_start[..end], true));
        }
        remaining = &after_start[end + 2..];
    }

    if !remaining.is_empty() {
        spans.push((remaining, false));
    }
    spans
}

/// Text with `**` markers removed.
pub fn plain_text(text: &str) -> String {
    inline_spans(text).into_iter().map(|(s, _)| s).collect()
}
