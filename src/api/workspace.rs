// src/api/workspace.rs
//! One entry point over the three Notion clients, plus the todo and
//! markdown workflows built on top of them.

use super::blocks::{AppendOutcome, BlocksApi};
use super::client::NotionHttpClient;
use super::databases::DatabasesApi;
use super::pages::PagesApi;
use super::query::{create_sort, SortDirection};
use super::retrying::RetryingTransport;
use super::{ApiRequest, NotionTransport};
use crate::config::ClientConfig;
use crate::constants::{MAX_BLOCKS_PER_APPEND, NOTION_API_PAGE_SIZE, TODO_DEFAULT_STATUS};
use crate::error::Result;
use crate::formatting::{blocks_to_markdown, parse_markdown_to_blocks};
use crate::model::{create_todo_properties, NewTodo, Page, TodoList};
use crate::types::{BlockId, DatabaseId};
use serde_json::Value;
use std::sync::Arc;

/// The block, page and database clients sharing one transport.
#[derive(Clone)]
pub struct NotionWorkspace {
    pub blocks: BlocksApi,
    pub pages: PagesApi,
    pub databases: DatabasesApi,
    transport: Arc<dyn NotionTransport>,
}

impl NotionWorkspace {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self {
            blocks: BlocksApi::new(transport.clone()),
            pages: PagesApi::new(transport.clone()),
            databases: DatabasesApi::new(transport.clone()),
            transport,
        }
    }

    /// HTTP client with the configured timeout, wrapped in the retry policy.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = NotionHttpClient::new(&config.api_key, Some(config.timeout))?;
        let transport = RetryingTransport::new(http, config.retry);
        Ok(Self::new(Arc::new(transport)))
    }

    /// Checks the API key by fetching the integration's bot user.
    pub async fn verify_connection(&self) -> Result<Value> {
        let user = self.transport.send(ApiRequest::get("users/me")).await?;
        log::info!(
            "Connected to Notion as {}",
            user.get("name").and_then(Value::as_str).unwrap_or("unknown bot")
        );
        Ok(user)
    }

    /// Creates a todo row. Status falls back to "Not Started".
    pub async fn add_todo(&self, database: &DatabaseId, todo: &NewTodo) -> Result<Page> {
        let mut todo = todo.clone();
        if todo.status.as_deref().map_or(true, |s| s.trim().is_empty()) {
            todo.status = Some(TODO_DEFAULT_STATUS.to_string());
        }
        let properties = create_todo_properties(&todo)?;
        let page = self
            .pages
            .create_page(database.as_str(), &properties, &[], true)
            .await?;
        log::info!("Added todo '{}' as {}", todo.task, page.id);
        Ok(page)
    }

    /// Todos whose `property` (or title) contains `query`.
    ///
    /// Sorting by `sort_by` uses `direction`; without it Notion's order is
    /// kept.
    pub async fn search_todos(
        &self,
        database: &DatabaseId,
        query: &str,
        property: Option<&str>,
        sort_by: Option<&str>,
        direction: SortDirection,
    ) -> Result<TodoList> {
        let sort = sort_by
            .map(|property| create_sort(property, direction.as_str()))
            .transpose()?;
        let rows = self
            .databases
            .search_database(database, query, property, sort, None, NOTION_API_PAGE_SIZE)
            .await?;
        Ok(TodoList::from(rows))
    }

    /// Parses `markdown` and appends the blocks under `parent`.
    pub async fn append_markdown(
        &self,
        parent: &BlockId,
        markdown: &str,
        after: Option<&BlockId>,
    ) -> Result<AppendOutcome> {
        let blocks = parse_markdown_to_blocks(markdown)?;
        log::debug!("Parsed {} blocks from markdown", blocks.len());
        self.blocks
            .append_children(parent, &blocks, after, MAX_BLOCKS_PER_APPEND)
            .await
    }

    /// Renders every child of `block` as markdown.
    pub async fn export_markdown(&self, block: &BlockId) -> Result<String> {
        let children = self.blocks.get_all_children(block).await?;
        Ok(blocks_to_markdown(&children))
    }
}
