//! Validated constructors for rich text runs and blocks.
//!
//! Every block sent to Notion is built here, so kind-specific rules are
//! enforced before a request is made.

use crate::model::{Block, BlockBody, BlockKind, CodeContent, TextBlockContent, ToDoContent};
use crate::types::{Annotations, Color, RichText, ValidationError};
use serde_json::{Map, Value};

/// Builds the single-run rich text array Notion expects for one piece of text.
///
/// `annotations` is the caller's raw annotation object; unknown keys and a
/// non-string `color` are rejected.
pub fn create_rich_text(
    content: Option<&str>,
    link: Option<&str>,
    annotations: Option<&Value>,
) -> Result<Vec<RichText>, ValidationError> {
    let annotations = annotations.map(Annotations::from_value).transpose()?;
    let content = content.ok_or(ValidationError::EmptyContent)?;
    Ok(vec![RichText::new(content, link, annotations)?])
}

/// Builds a block of `kind`.
///
/// Structural kinds ignore every other argument. Code blocks accept empty
/// content and take their `language` from `extra`. All other kinds require
/// content; `extra` is merged into the block payload (`checked` and
/// `is_subtask` for to-dos, `color` for any text block).
pub fn create_block(
    kind: BlockKind,
    content: Option<&str>,
    annotations: Option<Annotations>,
    link: Option<&str>,
    extra: Option<Map<String, Value>>,
) -> Result<Block, ValidationError> {
    let mut extra = extra.unwrap_or_default();

    let body = match kind {
        BlockKind::Divider => BlockBody::Divider,
        BlockKind::ColumnList => BlockBody::ColumnList,
        BlockKind::Column => BlockBody::Column,
        BlockKind::Code => BlockBody::Code(code_content(content, &mut extra)?),
        BlockKind::ToDo => {
            let rich_text = text_runs(content, link, annotations)?;
            BlockBody::ToDo(ToDoContent {
                rich_text,
                checked: take_flag(kind, &mut extra, "checked")?,
                is_subtask: take_flag(kind, &mut extra, "is_subtask")?,
                color: take_color(kind, &mut extra)?,
                extra: without_rich_text(kind, extra)?,
            })
        }
        _ => {
            let content = TextBlockContent {
                rich_text: text_runs(content, link, annotations)?,
                color: take_color(kind, &mut extra)?,
                extra: without_rich_text(kind, extra)?,
            };
            text_body(kind, content)
        }
    };

    Ok(Block::new(body))
}

/// A to-do block; subtasks are to-dos nested under another to-do.
pub fn todo(
    content: &str,
    checked: bool,
    annotations: Option<Annotations>,
    is_subtask: bool,
) -> Result<Block, ValidationError> {
    let mut extra = Map::new();
    extra.insert("checked".to_string(), Value::Bool(checked));
    extra.insert("is_subtask".to_string(), Value::Bool(is_subtask));
    create_block(BlockKind::ToDo, Some(content), annotations, None, Some(extra))
}

pub fn bulleted_list_item(
    content: &str,
    annotations: Option<Annotations>,
) -> Result<Block, ValidationError> {
    create_block(BlockKind::BulletedListItem, Some(content), annotations, None, None)
}

/// A paragraph, heading or other plain text block, optionally linked.
pub fn rich_text_block(
    kind: BlockKind,
    content: &str,
    annotations: Option<Annotations>,
    link: Option<&str>,
) -> Result<Block, ValidationError> {
    create_block(kind, Some(content), annotations, link, None)
}

fn text_runs(
    content: Option<&str>,
    link: Option<&str>,
    annotations: Option<Annotations>,
) -> Result<Vec<RichText>, ValidationError> {
    let content = content.ok_or(ValidationError::EmptyContent)?;
    Ok(vec![RichText::new(content, link, annotations)?])
}

fn text_body(kind: BlockKind, content: TextBlockContent) -> BlockBody {
    match kind {
        BlockKind::Heading1 => BlockBody::Heading1(content),
        BlockKind::Heading2 => BlockBody::Heading2(content),
        BlockKind::Heading3 => BlockBody::Heading3(content),
        BlockKind::BulletedListItem => BlockBody::BulletedListItem(content),
        BlockKind::NumberedListItem => BlockBody::NumberedListItem(content),
        BlockKind::Toggle => BlockBody::Toggle(content),
        BlockKind::Quote => BlockBody::Quote(content),
        BlockKind::Callout => BlockBody::Callout(content),
        _ => BlockBody::Paragraph(content),
    }
}

fn code_content(
    content: Option<&str>,
    extra: &mut Map<String, Value>,
) -> Result<CodeContent, ValidationError> {
    let language = match extra.remove("language") {
        None | Some(Value::Null) => None,
        Some(Value::String(language)) => Some(language).filter(|l| !l.trim().is_empty()),
        Some(other) => {
            return Err(invalid_property(
                BlockKind::Code,
                "language",
                format!("expected a string, got {}", other),
            ))
        }
    };

    // The language rides in a nominal rich text run; the code itself is
    // kept verbatim in `content`.
    let rich_text = match &language {
        Some(language) => vec![RichText::new(language, None, None)?],
        None => Vec::new(),
    };

    Ok(CodeContent {
        rich_text,
        language,
        content: Some(content.unwrap_or_default().to_string()),
        extra: without_rich_text(BlockKind::Code, std::mem::take(extra))?,
    })
}

fn take_flag(
    kind: BlockKind,
    extra: &mut Map<String, Value>,
    name: &str,
) -> Result<bool, ValidationError> {
    match extra.remove(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(flag),
        Some(other) => Err(invalid_property(
            kind,
            name,
            format!("expected a boolean, got {}", other),
        )),
    }
}

fn take_color(
    kind: BlockKind,
    extra: &mut Map<String, Value>,
) -> Result<Option<Color>, ValidationError> {
    match extra.remove("color") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.parse()?)),
        Some(other) => Err(invalid_property(
            kind,
            "color",
            format!("expected a color name, got {}", other),
        )),
    }
}

fn without_rich_text(
    kind: BlockKind,
    extra: Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    if extra.contains_key("rich_text") {
        return Err(invalid_property(
            kind,
            "rich_text",
            "rich text is built from the block content".to_string(),
        ));
    }
    Ok(extra)
}

fn invalid_property(kind: BlockKind, name: &str, reason: String) -> ValidationError {
    ValidationError::InvalidBlockProperty {
        block_type: kind.as_str(),
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rich_text_rejects_missing_and_blank_content() {
        for content in [None, Some(""), Some("   ")] {
            assert_eq!(
                create_rich_text(content, None, None).unwrap_err(),
                ValidationError::EmptyContent
            );
        }
    }

    #[test]
    fn rich_text_length_boundary() {
        let at_limit = "a".repeat(2000);
        assert_eq!(create_rich_text(Some(&at_limit), None, None).unwrap().len(), 1);

        let over = "a".repeat(2001);
        assert_eq!(
            create_rich_text(Some(&over), None, None).unwrap_err(),
            ValidationError::ContentTooLong {
                actual: 2001,
                max: 2000
            }
        );
    }

    #[test]
    fn rich_text_annotation_rules() {
        assert!(matches!(
            create_rich_text(Some("x"), None, Some(&json!({"shadow": true}))),
            Err(ValidationError::InvalidAnnotations(_))
        ));
        assert_eq!(
            create_rich_text(Some("x"), None, Some(&json!({"color": true}))).unwrap_err(),
            ValidationError::NonStringColor
        );
        let runs =
            create_rich_text(Some("x"), None, Some(&json!({"bold": true, "color": "blue"})))
                .unwrap();
        assert_eq!(
            serde_json::to_value(&runs).unwrap(),
            json!([{"type": "text", "text": {"content": "x"},
                    "annotations": {"bold": true, "color": "blue"}}])
        );
    }

    #[test]
    fn rich_text_rejects_malformed_links() {
        assert!(matches!(
            create_rich_text(Some("x"), Some("not a url"), None),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn structural_blocks_ignore_content() {
        let block = create_block(BlockKind::Divider, Some("ignored"), None, None, None).unwrap();
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "divider", "divider": {}})
        );
    }

    #[test]
    fn text_blocks_require_content() {
        assert_eq!(
            create_block(BlockKind::Quote, None, None, None, None).unwrap_err(),
            ValidationError::EmptyContent
        );
    }

    #[test]
    fn code_block_keeps_language_and_content_apart() {
        let mut extra = Map::new();
        extra.insert("language".to_string(), json!("python"));
        let block = create_block(
            BlockKind::Code,
            Some("def f():\n    return 1"),
            None,
            None,
            Some(extra),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "code", "code": {
                "rich_text": [{"type": "text", "text": {"content": "python"}}],
                "language": "python",
                "content": "def f():\n    return 1"
            }})
        );
    }

    #[test]
    fn code_block_may_be_empty() {
        let block = create_block(BlockKind::Code, None, None, None, None).unwrap();
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "code", "code": {"content": ""}})
        );
    }

    #[test]
    fn subtask_todo_shape() {
        let block = todo("Write tests", false, None, true).unwrap();
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "to_do", "to_do": {
                "rich_text": [{"type": "text", "text": {"content": "Write tests"}}],
                "checked": false,
                "is_subtask": true
            }})
        );
    }

    #[test]
    fn extra_properties_are_merged_and_checked() {
        let mut extra = Map::new();
        extra.insert("color".to_string(), json!("red_background"));
        extra.insert("icon".to_string(), json!({"type": "emoji", "emoji": "🔥"}));
        let block =
            create_block(BlockKind::Callout, Some("Hot"), None, None, Some(extra)).unwrap();
        let wire = serde_json::to_value(&block).unwrap();
        assert_eq!(wire["callout"]["color"], "red_background");
        assert_eq!(wire["callout"]["icon"]["emoji"], "🔥");

        let mut bad = Map::new();
        bad.insert("checked".to_string(), json!("yes"));
        assert!(matches!(
            create_block(BlockKind::ToDo, Some("x"), None, None, Some(bad)),
            Err(ValidationError::InvalidBlockProperty { name, .. }) if name == "checked"
        ));
    }

    #[test]
    fn building_is_deterministic() {
        let a = rich_text_block(BlockKind::Heading2, "Same", Some(Annotations::bold()), None);
        let b = rich_text_block(BlockKind::Heading2, "Same", Some(Annotations::bold()), None);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn linked_text_block_normalises_url() {
        let block = rich_text_block(
            BlockKind::Paragraph,
            "docs",
            None,
            Some("https://developers.notion.com/"),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&block).unwrap()["paragraph"]["rich_text"][0]["text"]["link"],
            json!({"url": "https://developers.notion.com"})
        );
    }
}
