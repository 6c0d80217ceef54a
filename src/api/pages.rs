// src/api/pages.rs
//! Page CRUD and property retrieval.

use super::responses::decode;
use super::{ApiRequest, NotionTransport};
use crate::error::Result;
use crate::model::{Block, NewTodo, Page, Parent, Properties};
use crate::types::{PageId, ValidationError};
use serde_json::{json, Value};
use std::sync::Arc;

/// Client for the `pages` endpoints.
#[derive(Clone)]
pub struct PagesApi {
    transport: Arc<dyn NotionTransport>,
}

impl PagesApi {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self { transport }
    }

    async fn call(&self, request: ApiRequest, operation: &str, id: &str) -> Result<Value> {
        self.transport.send(request).await.map_err(|e| {
            log::error!("{} failed for {}: {}", operation, id, e);
            e
        })
    }

    /// Creates a page under a database (`is_database`) or under another page.
    ///
    /// `children` become the page body; an empty slice sends no body.
    pub async fn create_page(
        &self,
        parent_id: &str,
        properties: &Properties,
        children: &[Block],
        is_database: bool,
    ) -> Result<Page> {
        let parent = Parent::for_new_page(parent_id, is_database)?;
        let mut body = json!({
            "parent": parent,
            "properties": properties,
        });
        if !children.is_empty() {
            body["children"] = json!(children);
        }
        let value = self
            .call(ApiRequest::post("pages", body), "create_page", parent_id)
            .await?;
        let page: Page = decode(value, "pages")?;
        log::info!("Created page {}", page.id);
        Ok(page)
    }

    pub async fn get_page(&self, id: &PageId) -> Result<Page> {
        let path = format!("pages/{}", id);
        let value = self
            .call(ApiRequest::get(&path), "get_page", id.as_str())
            .await?;
        decode(value, &path)
    }

    /// Updates properties, the archived flag, or both.
    pub async fn update_page(
        &self,
        id: &PageId,
        properties: Option<&Properties>,
        archived: Option<bool>,
    ) -> Result<Page> {
        if properties.is_none() && archived.is_none() {
            return Err(ValidationError::NothingToUpdate.into());
        }

        let mut body = json!({});
        if let Some(properties) = properties {
            body["properties"] = json!(properties);
        }
        if let Some(archived) = archived {
            body["archived"] = json!(archived);
        }

        let path = format!("pages/{}", id);
        let value = self
            .call(ApiRequest::patch(&path, body), "update_page", id.as_str())
            .await?;
        decode(value, &path)
    }

    pub async fn archive_page(&self, id: &PageId) -> Result<Page> {
        self.update_page(id, None, Some(true)).await
    }

    pub async fn restore_page(&self, id: &PageId) -> Result<Page> {
        self.update_page(id, None, Some(false)).await
    }

    /// One property of a page. Paginated property types (title, rich text,
    /// relation, people) come back as a property item list.
    pub async fn get_property_item(
        &self,
        id: &PageId,
        property_id: &str,
        page_size: u32,
    ) -> Result<Value> {
        if page_size == 0 {
            return Err(ValidationError::NonPositivePageSize.into());
        }
        let path = format!("pages/{}/properties/{}", id, property_id);
        let request = ApiRequest::get(&path).with_query("page_size", page_size);
        self.call(request, "get_property_item", id.as_str()).await
    }

    /// Property bag for a todo row. See [`crate::model::create_todo_properties`].
    pub fn create_todo_properties(&self, todo: &NewTodo) -> Result<Properties> {
        Ok(crate::model::create_todo_properties(todo)?)
    }
}
