mod block;
pub mod blocks;
pub mod properties;
mod todo;

pub use block::{Block, BlockBody, BlockKind};
pub use blocks::{CodeContent, TextBlockContent, ToDoContent};
pub use properties::{DateValue, Properties, PropertySchema, PropertyValue, Schema, SelectOption};
pub use todo::{create_todo_properties, todo_database_schema, NewTodo, Priority, Todo, TodoList};

use crate::types::{plain_text, BlockId, DatabaseId, PageId, RichText, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent reference with typed IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: BlockId },
    #[serde(rename = "workspace")]
    Workspace,
    #[serde(other)]
    Unknown,
}

impl Parent {
    /// Parent reference for a new page: a database row or a sub-page.
    pub fn for_new_page(parent_id: &str, is_database: bool) -> Result<Self, ValidationError> {
        Ok(if is_database {
            Parent::Database {
                database_id: DatabaseId::parse(parent_id)?,
            }
        } else {
            Parent::Page {
                page_id: PageId::parse(parent_id)?,
            }
        })
    }
}

/// A Notion page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
}

impl Page {
    /// Text of the page's title property, whatever it is named.
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find_map(|value| match value {
                PropertyValue::Title(runs) => Some(plain_text(runs)),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// A Notion database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: Schema,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl Database {
    pub fn title_text(&self) -> String {
        plain_text(&self.title)
    }
}

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}
