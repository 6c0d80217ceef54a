// src/api/blocks.rs
//! Remote CRUD on the block tree, including batched appends and to-do
//! subtasks.

use super::pagination::fetch_all_pages;
use super::responses::decode;
use super::{ApiRequest, NotionTransport};
use crate::constants::{MAX_BLOCKS_PER_APPEND, NOTION_API_PAGE_SIZE};
use crate::error::Result;
use crate::formatting::todo;
use crate::model::{Block, Paginated};
use crate::types::{Annotations, BlockId, ValidationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Result of [`BlocksApi::append_children`].
///
/// A single request answers with one list; a batched append answers with
/// one list per chunk, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AppendOutcome {
    Single(Paginated<Block>),
    Batched(Vec<Paginated<Block>>),
}

impl AppendOutcome {
    /// Number of append requests that were sent.
    pub fn request_count(&self) -> usize {
        match self {
            AppendOutcome::Single(_) => 1,
            AppendOutcome::Batched(responses) => responses.len(),
        }
    }

    /// Every block Notion reported back, across all chunks.
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            AppendOutcome::Single(response) => response.results,
            AppendOutcome::Batched(responses) => {
                responses.into_iter().flat_map(|r| r.results).collect()
            }
        }
    }
}

/// Client for the `blocks` endpoints.
#[derive(Clone)]
pub struct BlocksApi {
    transport: Arc<dyn NotionTransport>,
}

impl BlocksApi {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self { transport }
    }

    async fn call(&self, request: ApiRequest, operation: &str, id: &BlockId) -> Result<Value> {
        self.transport.send(request).await.map_err(|e| {
            log::error!("{} failed for block {}: {}", operation, id, e);
            e
        })
    }

    pub async fn get_block(&self, id: &BlockId) -> Result<Block> {
        let path = format!("blocks/{}", id);
        let value = self.call(ApiRequest::get(&path), "get_block", id).await?;
        decode(value, &path)
    }

    /// One page of a block's children. The caller drives pagination.
    pub async fn get_children(
        &self,
        id: &BlockId,
        page_size: u32,
        start_cursor: Option<&str>,
    ) -> Result<Paginated<Block>> {
        if page_size == 0 {
            return Err(ValidationError::NonPositivePageSize.into());
        }
        let path = format!("blocks/{}/children", id);
        let mut request = ApiRequest::get(&path).with_query("page_size", page_size);
        if let Some(cursor) = start_cursor {
            request = request.with_query("start_cursor", cursor);
        }
        let value = self.call(request, "get_block_children", id).await?;
        decode(value, &path)
    }

    /// Every child of a block, following cursors until the list is exhausted.
    pub async fn get_all_children(&self, id: &BlockId) -> Result<Vec<Block>> {
        fetch_all_pages(
            |page_size, cursor| async move {
                self.get_children(id, page_size, cursor.as_deref()).await
            },
            None,
        )
        .await
    }

    /// Appends blocks under `id`, optionally after the sibling `after`.
    ///
    /// When there are more blocks than `batch_size`, they are sent as
    /// sequential chunks. The first chunk uses `after`; each later chunk is
    /// anchored to the id of the last block of the previous input chunk,
    /// not to the ids Notion returned. Chunks sent before a failure stay
    /// committed.
    pub async fn append_children(
        &self,
        id: &BlockId,
        blocks: &[Block],
        after: Option<&BlockId>,
        batch_size: usize,
    ) -> Result<AppendOutcome> {
        if batch_size > MAX_BLOCKS_PER_APPEND {
            return Err(ValidationError::BatchTooLarge {
                actual: batch_size,
                max: MAX_BLOCKS_PER_APPEND,
            }
            .into());
        }
        if batch_size == 0 {
            return Err(ValidationError::NonPositivePageSize.into());
        }

        if blocks.len() <= batch_size {
            let response = self.append_chunk(id, blocks, after).await?;
            return Ok(AppendOutcome::Single(response));
        }

        let mut responses = Vec::with_capacity(blocks.len().div_ceil(batch_size));
        for (index, chunk) in blocks.chunks(batch_size).enumerate() {
            let anchor = if index == 0 {
                after
            } else {
                blocks[index * batch_size - 1].id.as_ref()
            };
            responses.push(self.append_chunk(id, chunk, anchor).await?);
        }

        log::info!(
            "Appended {} blocks to {} in {} requests",
            blocks.len(),
            id,
            responses.len()
        );
        Ok(AppendOutcome::Batched(responses))
    }

    async fn append_chunk(
        &self,
        id: &BlockId,
        children: &[Block],
        after: Option<&BlockId>,
    ) -> Result<Paginated<Block>> {
        let path = format!("blocks/{}/children", id);
        let mut body = json!({ "children": children });
        if let Some(after) = after {
            body["after"] = json!(after);
        }
        let value = self
            .call(ApiRequest::patch(&path, body), "append_children", id)
            .await?;
        decode(value, &path)
    }

    /// Sends a partial block update, e.g. `{"to_do": {"checked": true}}`.
    pub async fn update_block(&self, id: &BlockId, properties: &Value) -> Result<Block> {
        let path = format!("blocks/{}", id);
        let value = self
            .call(ApiRequest::patch(&path, properties.clone()), "update_block", id)
            .await?;
        decode(value, &path)
    }

    /// Moves a block to the trash. Notion answers with the archived block.
    pub async fn delete_block(&self, id: &BlockId) -> Result<Block> {
        let path = format!("blocks/{}", id);
        let value = self
            .call(ApiRequest::delete(&path), "delete_block", id)
            .await?;
        decode(value, &path)
    }

    /// Appends a subtask to-do under the to-do `parent`.
    pub async fn create_subtask(
        &self,
        parent: &BlockId,
        content: &str,
        checked: bool,
        annotations: Option<Annotations>,
    ) -> Result<Paginated<Block>> {
        let subtask = todo(content, checked, annotations, true)?;
        let response = self.append_chunk(parent, &[subtask], None).await?;
        log::info!("Created subtask under {}: {}", parent, content);
        Ok(response)
    }

    /// Direct to-do children of `parent` that are marked as subtasks.
    pub async fn get_subtasks(&self, parent: &BlockId, page_size: u32) -> Result<Vec<Block>> {
        let children = self.get_children(parent, page_size, None).await?;
        let subtasks: Vec<Block> = children
            .results
            .into_iter()
            .filter(Block::is_subtask)
            .collect();
        log::debug!("Found {} subtasks under {}", subtasks.len(), parent);
        Ok(subtasks)
    }

    /// Sets a subtask's `checked` state.
    ///
    /// With `update_parent`, the containing to-do is then set to checked
    /// exactly when all its subtasks are, and the parent's updated block is
    /// returned. Otherwise the refreshed subtask is returned.
    ///
    /// The read-modify-write across siblings is not atomic: a concurrent
    /// change to another subtask can leave the parent stale.
    pub async fn update_subtask_status(
        &self,
        subtask: &BlockId,
        checked: bool,
        update_parent: bool,
    ) -> Result<Block> {
        self.update_block(subtask, &json!({ "to_do": { "checked": checked } }))
            .await?;

        if update_parent {
            let current = self.get_block(subtask).await?;
            if let Some(parent) = current.parent_block_id() {
                let siblings = self.get_subtasks(parent, NOTION_API_PAGE_SIZE).await?;
                let all_checked = siblings.iter().all(|s| s.checked().unwrap_or(false));
                let updated = self
                    .update_block(parent, &json!({ "to_do": { "checked": all_checked } }))
                    .await?;
                log::info!(
                    "Subtask {} set to {}; parent {} now {}",
                    subtask,
                    checked,
                    parent,
                    all_checked
                );
                return Ok(updated);
            }
        }

        log::info!("Subtask {} set to {}", subtask, checked);
        self.get_block(subtask).await
    }
}
