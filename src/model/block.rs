use super::blocks::{CodeContent, TextBlockContent, ToDoContent};
use super::Parent;
use crate::types::{plain_text, BlockId, RichText, ValidationError};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The block kinds this crate can build and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Toggle,
    Code,
    Quote,
    Callout,
    Divider,
    ColumnList,
    Column,
}

impl BlockKind {
    pub const ALL: [BlockKind; 14] = [
        BlockKind::Paragraph,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::BulletedListItem,
        BlockKind::NumberedListItem,
        BlockKind::ToDo,
        BlockKind::Toggle,
        BlockKind::Code,
        BlockKind::Quote,
        BlockKind::Callout,
        BlockKind::Divider,
        BlockKind::ColumnList,
        BlockKind::Column,
    ];

    /// The Notion `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading_1",
            BlockKind::Heading2 => "heading_2",
            BlockKind::Heading3 => "heading_3",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::ToDo => "to_do",
            BlockKind::Toggle => "toggle",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Callout => "callout",
            BlockKind::Divider => "divider",
            BlockKind::ColumnList => "column_list",
            BlockKind::Column => "column",
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::BulletedListItem | BlockKind::NumberedListItem)
    }
}

impl std::str::FromStr for BlockKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidBlockType(s.to_string()))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type-specific half of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBody {
    Paragraph(TextBlockContent),
    Heading1(TextBlockContent),
    Heading2(TextBlockContent),
    Heading3(TextBlockContent),
    BulletedListItem(TextBlockContent),
    NumberedListItem(TextBlockContent),
    ToDo(ToDoContent),
    Toggle(TextBlockContent),
    Code(CodeContent),
    Quote(TextBlockContent),
    Callout(TextBlockContent),
    Divider,
    ColumnList,
    Column,
    /// A block type read from Notion that this crate does not model.
    Unsupported { kind: String, payload: Value },
}

impl BlockBody {
    pub fn kind(&self) -> Option<BlockKind> {
        Some(match self {
            BlockBody::Paragraph(_) => BlockKind::Paragraph,
            BlockBody::Heading1(_) => BlockKind::Heading1,
            BlockBody::Heading2(_) => BlockKind::Heading2,
            BlockBody::Heading3(_) => BlockKind::Heading3,
            BlockBody::BulletedListItem(_) => BlockKind::BulletedListItem,
            BlockBody::NumberedListItem(_) => BlockKind::NumberedListItem,
            BlockBody::ToDo(_) => BlockKind::ToDo,
            BlockBody::Toggle(_) => BlockKind::Toggle,
            BlockBody::Code(_) => BlockKind::Code,
            BlockBody::Quote(_) => BlockKind::Quote,
            BlockBody::Callout(_) => BlockKind::Callout,
            BlockBody::Divider => BlockKind::Divider,
            BlockBody::ColumnList => BlockKind::ColumnList,
            BlockBody::Column => BlockKind::Column,
            BlockBody::Unsupported { .. } => return None,
        })
    }

    pub fn type_name(&self) -> &str {
        match self {
            BlockBody::Unsupported { kind, .. } => kind,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    fn from_payload(kind: BlockKind, payload: Value) -> Result<Self, serde_json::Error> {
        let text = |payload: Value| serde_json::from_value::<TextBlockContent>(payload);
        Ok(match kind {
            BlockKind::Paragraph => BlockBody::Paragraph(text(payload)?),
            BlockKind::Heading1 => BlockBody::Heading1(text(payload)?),
            BlockKind::Heading2 => BlockBody::Heading2(text(payload)?),
            BlockKind::Heading3 => BlockBody::Heading3(text(payload)?),
            BlockKind::BulletedListItem => BlockBody::BulletedListItem(text(payload)?),
            BlockKind::NumberedListItem => BlockBody::NumberedListItem(text(payload)?),
            BlockKind::ToDo => BlockBody::ToDo(serde_json::from_value(payload)?),
            BlockKind::Toggle => BlockBody::Toggle(text(payload)?),
            BlockKind::Code => BlockBody::Code(serde_json::from_value(payload)?),
            BlockKind::Quote => BlockBody::Quote(text(payload)?),
            BlockKind::Callout => BlockBody::Callout(text(payload)?),
            BlockKind::Divider => BlockBody::Divider,
            BlockKind::ColumnList => BlockBody::ColumnList,
            BlockKind::Column => BlockBody::Column,
        })
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            BlockBody::Paragraph(c)
            | BlockBody::Heading1(c)
            | BlockBody::Heading2(c)
            | BlockBody::Heading3(c)
            | BlockBody::BulletedListItem(c)
            | BlockBody::NumberedListItem(c)
            | BlockBody::Toggle(c)
            | BlockBody::Quote(c)
            | BlockBody::Callout(c) => serde_json::to_value(c),
            BlockBody::ToDo(c) => serde_json::to_value(c),
            BlockBody::Code(c) => serde_json::to_value(c),
            BlockBody::Divider | BlockBody::ColumnList | BlockBody::Column => {
                Ok(Value::Object(Map::new()))
            }
            BlockBody::Unsupported { payload, .. } => Ok(payload.clone()),
        }
    }
}

/// A Notion block: identity and tree position plus a typed body.
///
/// Blocks built locally have no `id` or `parent`; blocks read back from
/// Notion carry both.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: Option<BlockId>,
    pub parent: Option<Parent>,
    pub has_children: bool,
    pub archived: bool,
    pub body: BlockBody,
}

impl Block {
    pub fn new(body: BlockBody) -> Self {
        Self {
            id: None,
            parent: None,
            has_children: false,
            archived: false,
            body,
        }
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn kind(&self) -> Option<BlockKind> {
        self.body.kind()
    }

    pub fn type_name(&self) -> &str {
        self.body.type_name()
    }

    /// The inline text runs of text-bearing blocks.
    ///
    /// For code blocks this is the nominal run, not the source.
    pub fn rich_text(&self) -> Option<&[RichText]> {
        match &self.body {
            BlockBody::Paragraph(c)
            | BlockBody::Heading1(c)
            | BlockBody::Heading2(c)
            | BlockBody::Heading3(c)
            | BlockBody::BulletedListItem(c)
            | BlockBody::NumberedListItem(c)
            | BlockBody::Toggle(c)
            | BlockBody::Quote(c)
            | BlockBody::Callout(c) => Some(&c.rich_text),
            BlockBody::ToDo(c) => Some(&c.rich_text),
            BlockBody::Code(c) => Some(&c.rich_text),
            _ => None,
        }
    }

    /// Visible text of the block, or an empty string for structural blocks.
    pub fn plain_text(&self) -> String {
        match &self.body {
            BlockBody::Code(code) => code.source().to_string(),
            _ => self.rich_text().map(plain_text).unwrap_or_default(),
        }
    }

    /// `Some(checked)` for to-do blocks.
    pub fn checked(&self) -> Option<bool> {
        match &self.body {
            BlockBody::ToDo(todo) => Some(todo.checked),
            _ => None,
        }
    }

    pub fn is_subtask(&self) -> bool {
        matches!(&self.body, BlockBody::ToDo(todo) if todo.is_subtask)
    }

    /// The containing block, when the parent is a block rather than a page.
    pub fn parent_block_id(&self) -> Option<&BlockId> {
        match &self.parent {
            Some(Parent::Block { block_id }) => Some(block_id),
            _ => None,
        }
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let payload = self.body.payload().map_err(serde::ser::Error::custom)?;
        let type_name = self.type_name();

        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(parent) = &self.parent {
            map.serialize_entry("parent", parent)?;
        }
        if self.has_children {
            map.serialize_entry("has_children", &true)?;
        }
        if self.archived {
            map.serialize_entry("archived", &true)?;
        }
        map.serialize_entry("type", type_name)?;
        map.serialize_entry(type_name, &payload)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: Option<BlockId>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    parent: Option<Parent>,
    #[serde(default)]
    has_children: bool,
    #[serde(default)]
    archived: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut raw = RawBlock::deserialize(deserializer)?;
        let payload = raw
            .rest
            .remove(&raw.kind)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let body = match raw.kind.parse::<BlockKind>() {
            Ok(kind) => BlockBody::from_payload(kind, payload).map_err(|e| {
                D::Error::custom(format!("invalid {} block: {}", raw.kind, e))
            })?,
            Err(_) => BlockBody::Unsupported {
                kind: raw.kind,
                payload,
            },
        };

        Ok(Self {
            id: raw.id,
            parent: raw.parent,
            has_children: raw.has_children,
            archived: raw.archived,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_notion_to_do_response() {
        let block: Block = serde_json::from_value(json!({
            "object": "block",
            "id": "c02fc1d3-db8b-45c5-a222-27595b15aea7",
            "parent": {"type": "block_id", "block_id": "59833787-2cf9-4fdf-8782-e53db20768a5"},
            "created_time": "2022-03-01T19:05:00.000Z",
            "has_children": false,
            "archived": false,
            "type": "to_do",
            "to_do": {
                "rich_text": [{
                    "type": "text",
                    "text": {"content": "Ship it", "link": null},
                    "annotations": {"bold": false, "italic": false, "strikethrough": false,
                                    "underline": false, "code": false, "color": "default"},
                    "plain_text": "Ship it",
                    "href": null
                }],
                "checked": true,
                "color": "default"
            }
        }))
        .unwrap();

        assert_eq!(block.kind(), Some(BlockKind::ToDo));
        assert_eq!(block.checked(), Some(true));
        assert!(!block.is_subtask());
        assert_eq!(block.plain_text(), "Ship it");
        assert_eq!(
            block.parent_block_id().map(|id| id.as_str()),
            Some("598337872cf94fdf8782e53db20768a5")
        );
    }

    #[test]
    fn unknown_types_are_kept_as_unsupported() {
        let raw = json!({
            "id": "c02fc1d3-db8b-45c5-a222-27595b15aea7",
            "type": "image",
            "image": {"type": "external", "external": {"url": "https://example.com/a.png"}}
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.kind(), None);
        assert_eq!(block.type_name(), "image");
        assert_eq!(serde_json::to_value(&block).unwrap()["image"], raw["image"]);
    }

    #[test]
    fn structural_blocks_serialize_with_empty_payload() {
        let block = Block::new(BlockBody::Divider);
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "divider", "divider": {}})
        );
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), kind);
        }
        assert_eq!(
            "template".parse::<BlockKind>().unwrap_err(),
            ValidationError::InvalidBlockType("template".to_string())
        );
    }
}
