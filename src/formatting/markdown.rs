//! Markdown to block conversion and back.
//!
//! The supported subset is line-oriented: headings, bulleted and numbered
//! items, to-dos, quotes, fenced code and paragraphs. Inline emphasis is
//! not parsed and passes through as text.

use super::builders::create_block;
use crate::model::{Block, BlockBody, BlockKind};
use crate::types::ValidationError;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static::lazy_static! {
    static ref NUMBERED_ITEM: Regex =
        Regex::new(r"^\d+\. ").expect("numbered list pattern is valid");
}

const FENCE: &str = "```";

/// Line prefixes in match order. `# ` is checked before `## ` but cannot
/// shadow it since `##` does not start with `# `.
const PREFIXES: [(&str, BlockKind); 5] = [
    ("# ", BlockKind::Heading1),
    ("## ", BlockKind::Heading2),
    ("### ", BlockKind::Heading3),
    ("- ", BlockKind::BulletedListItem),
    ("> ", BlockKind::Quote),
];

struct OpenFence {
    language: Option<String>,
    lines: Vec<String>,
}

/// Parses markdown into blocks, one block per non-blank line outside code
/// fences.
///
/// Builder failures are reported with the 1-based line they occurred on.
pub fn parse_markdown_to_blocks(markdown: &str) -> Result<Vec<Block>, ValidationError> {
    let mut blocks = Vec::new();
    let mut fence: Option<OpenFence> = None;

    for (index, raw_line) in markdown.split('\n').enumerate() {
        let line_number = index + 1;
        let raw_line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let line = raw_line.trim_end();

        if line.starts_with(FENCE) {
            match fence.take() {
                None => {
                    let language = line[FENCE.len()..].trim();
                    fence = Some(OpenFence {
                        language: (!language.is_empty()).then(|| language.to_string()),
                        lines: Vec::new(),
                    });
                }
                Some(open) => {
                    blocks.push(
                        code_block(open).map_err(|e| at_line(line_number, e))?,
                    );
                }
            }
            continue;
        }

        if let Some(open) = fence.as_mut() {
            open.lines.push(raw_line.to_string());
            continue;
        }

        if line.is_empty() {
            continue;
        }

        blocks.push(line_to_block(line).map_err(|e| at_line(line_number, e))?);
    }

    if fence.is_some() {
        return Err(ValidationError::UnclosedCodeBlock);
    }
    Ok(blocks)
}

fn line_to_block(line: &str) -> Result<Block, ValidationError> {
    for (prefix, kind) in PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return create_block(kind, Some(rest.trim()), None, None, None);
        }
    }

    if let Some(found) = NUMBERED_ITEM.find(line) {
        let rest = &line[found.end()..];
        return create_block(BlockKind::NumberedListItem, Some(rest.trim()), None, None, None);
    }

    for (prefix, checked) in [("[ ] ", false), ("[x] ", true)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            let mut extra = Map::new();
            extra.insert("checked".to_string(), Value::Bool(checked));
            return create_block(BlockKind::ToDo, Some(rest.trim()), None, None, Some(extra));
        }
    }

    create_block(BlockKind::Paragraph, Some(line.trim()), None, None, None)
}

fn code_block(open: OpenFence) -> Result<Block, ValidationError> {
    let mut extra = Map::new();
    if let Some(language) = open.language {
        extra.insert("language".to_string(), Value::String(language));
    }
    let source = open.lines.join("\n");
    create_block(BlockKind::Code, Some(&source), None, None, Some(extra))
}

fn at_line(line: usize, source: ValidationError) -> ValidationError {
    ValidationError::Line {
        line,
        source: Box::new(source),
    }
}

/// Serializes blocks back into markdown.
///
/// Blocks are separated by a blank line, except consecutive list items of
/// the same kind. Numbered items are renumbered from 1 after any other
/// block. Toggles and callouts render as bare text, dividers as `---`;
/// column layout and unsupported blocks are skipped.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut numbered = 0usize;
    // Kind of the block just before this one, `None` when it was skipped.
    let mut previous: Option<BlockKind> = None;

    for block in blocks {
        let kind = block
            .kind()
            .filter(|kind| !matches!(kind, BlockKind::ColumnList | BlockKind::Column));

        if kind == Some(BlockKind::NumberedListItem) {
            numbered += 1;
        } else {
            numbered = 0;
        }

        if let Some(kind) = kind {
            let continues_list = kind.is_list_item() && previous == Some(kind);
            if !lines.is_empty() && !continues_list {
                lines.push(String::new());
            }
            render_block(block, kind, numbered, &mut lines);
        }
        previous = kind;
    }

    lines.join("\n").trim().to_string()
}

fn render_block(block: &Block, kind: BlockKind, number: usize, lines: &mut Vec<String>) {
    if let BlockBody::Code(code) = &block.body {
        lines.push(format!("{}{}", FENCE, code.language.as_deref().unwrap_or_default()));
        let source = code.source();
        if !source.is_empty() {
            lines.push(source.to_string());
        }
        lines.push(FENCE.to_string());
        return;
    }

    let text = block.plain_text();
    let line = match kind {
        BlockKind::Heading1 => format!("# {}", text),
        BlockKind::Heading2 => format!("## {}", text),
        BlockKind::Heading3 => format!("### {}", text),
        BlockKind::BulletedListItem => format!("- {}", text),
        BlockKind::NumberedListItem => format!("{}. {}", number, text),
        BlockKind::ToDo => {
            let mark = if block.checked().unwrap_or(false) { 'x' } else { ' ' };
            format!("[{}] {}", mark, text)
        }
        BlockKind::Quote => format!("> {}", text),
        BlockKind::Divider => "---".to_string(),
        _ => text,
    };
    lines.push(line);
}
