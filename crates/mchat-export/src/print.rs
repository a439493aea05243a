use std::io::Write;

use crate::error::ExportError;
use crate::markdown::{Block, parse_blocks, plain_text};

const RULE_WIDTH: usize = 40;

/// Write the rendered report as plain text for a terminal or line printer.
///
/// Headings are underlined, `**` markers are dropped, rules become a dashed
/// line and page breaks become form feeds.
pub fn print_report<W: Write>(rendered: &str, out: &mut W) -> Result<(), ExportError> {
    let mut in_list = false;
    for block in parse_blocks(rendered) {
        let is_list = matches!(block, Block::Bullet(_) | Block::Numbered { .. });
        if in_list && !is_list {
            writeln!(out)?;
        }
        in_list = is_list;

        match block {
            Block::Heading { level, text } => {
                let text = plain_text(&text);
                let rule = if level == 1 { "=" } else { "-" };
                writeln!(out, "{text}")?;
                writeln!(out, "{}", rule.repeat(text.chars().count()))?;
                writeln!(out)?;
            }
            Block::Bullet(text) => writeln!(out, "  - {}", plain_text(&text))?,
            Block::Numbered { number, text } => {
                writeln!(out, "  {number}. {}", plain_text(&text))?
            }
            Block::Paragraph(text) => {
                writeln!(out, "{}", plain_text(&text))?;
                writeln!(out)?;
            }
            Block::Rule => {
                writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
                writeln!(out)?;
            }
            Block::PageBreak => write!(out, "\u{c}")?,
        }
    }
    out.flush()?;
    Ok(())
}
