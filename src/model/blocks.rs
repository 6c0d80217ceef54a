//! Per-kind payloads carried inside a [`Block`](super::Block).

use crate::types::{Color, RichText};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Payload of text-bearing blocks: paragraphs, headings, list items,
/// toggles, quotes and callouts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlockContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Fields this crate does not model, kept so they survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// To-do payload.
///
/// `is_subtask` marks a to-do nested under another to-do whose completion
/// is derived from its subtasks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToDoContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_subtask: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Code payload.
///
/// Blocks built from markdown carry the language as a nominal rich text
/// run and the exact source text in `content`, so whitespace survives
/// untouched. Code blocks read from Notion keep the source in `rich_text`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeContent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rich_text: Vec<RichText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeContent {
    /// The source text: the dedicated `content` field when present,
    /// otherwise the first rich text run.
    pub fn source(&self) -> &str {
        match &self.content {
            Some(content) => content,
            None => self
                .rich_text
                .first()
                .map(RichText::content)
                .unwrap_or_default(),
        }
    }
}
