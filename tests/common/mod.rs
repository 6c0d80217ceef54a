// tests/common/mod.rs
//! In-memory stand-in for the Notion API.
//!
//! Keeps a block tree, page rows and a request log, and answers the same
//! paths the clients build. Appended children keep an id they already carry,
//! so tests can predict anchors; otherwise a fresh id is assigned.
#![allow(dead_code)]

use notion_crud::{
    ApiRequest, AppError, BlockId, HttpMethod, NotionErrorCode, NotionTransport, RemoteError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

pub const ROOT_PAGE: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
pub const TODO_DATABASE: &str = "d9824bdc-8445-4327-be8b-5b47500af6ce";

#[derive(Default)]
struct State {
    blocks: HashMap<String, Value>,
    children: HashMap<String, Vec<String>>,
    pages: HashMap<String, Value>,
    databases: HashMap<String, Value>,
    page_order: Vec<String>,
    containers: HashSet<String>,
    requests: Vec<ApiRequest>,
    failures: VecDeque<AppError>,
}

#[derive(Default)]
pub struct FakeNotion {
    state: Mutex<State>,
}

impl FakeNotion {
    /// A workspace with one empty page, [`ROOT_PAGE`].
    pub fn new() -> Arc<Self> {
        let fake = Arc::new(Self::default());
        fake.state.lock().containers.insert(simple(ROOT_PAGE));
        fake
    }

    pub fn root() -> BlockId {
        BlockId::parse(ROOT_PAGE).unwrap()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    pub fn requests_matching(&self, method: HttpMethod, suffix: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// The next request fails with `error` before touching any state.
    pub fn fail_next(&self, error: AppError) {
        self.state.lock().failures.push_back(error);
    }

    /// Ids of the direct children of `parent`, in document order.
    pub fn child_ids(&self, parent: &str) -> Vec<String> {
        self.state
            .lock()
            .children
            .get(&simple(parent))
            .cloned()
            .unwrap_or_default()
    }

    pub fn stored_block(&self, id: &str) -> Option<Value> {
        self.state.lock().blocks.get(&simple(id)).cloned()
    }

    pub fn stored_page(&self, id: &str) -> Option<Value> {
        self.state.lock().pages.get(&simple(id)).cloned()
    }
}

#[async_trait::async_trait]
impl NotionTransport for FakeNotion {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        let segments: Vec<&str> = request.path.split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);
        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["users", "me"]) => {
                Ok(json!({"object": "user", "type": "bot", "name": "Fake integration"}))
            }
            (HttpMethod::Get, ["blocks", id]) => state.block(id),
            (HttpMethod::Get, ["blocks", id, "children"]) => Ok(state.list_children(id, &request)),
            (HttpMethod::Patch, ["blocks", id, "children"]) => Ok(state.append(id, &body)),
            (HttpMethod::Patch, ["blocks", id]) => state.update_block(id, &body),
            (HttpMethod::Delete, ["blocks", id]) => state.delete_block(id),
            (HttpMethod::Post, ["pages"]) => Ok(state.create_page(&body)),
            (HttpMethod::Get, ["pages", id]) => state.page(id),
            (HttpMethod::Patch, ["pages", id]) => state.update_page(id, &body),
            (HttpMethod::Post, ["databases"]) => Ok(state.create_database(&body)),
            (HttpMethod::Get, ["databases", id]) => state
                .databases
                .get(&simple(id))
                .cloned()
                .ok_or_else(|| not_found(id)),
            (HttpMethod::Post, ["databases", id, "query"]) => Ok(state.query(id, &body)),
            (HttpMethod::Post, ["search"]) => Ok(json!({
                "object": "list",
                "results": [{
                    "object": "database",
                    "id": TODO_DATABASE,
                    "title": [{"type": "text", "text": {"content": "Todos"}, "plain_text": "Todos"}],
                    "properties": {}
                }],
                "next_cursor": null,
                "has_more": false
            })),
            _ => Err(not_found(&request.path)),
        }
    }
}

impl State {
    fn block(&self, id: &str) -> Result<Value, AppError> {
        self.blocks
            .get(&simple(id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn list_children(&self, id: &str, request: &ApiRequest) -> Value {
        let ids = self.children.get(&simple(id)).cloned().unwrap_or_default();
        let page_size: usize = request
            .query_param("page_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);
        let start: usize = request
            .query_param("start_cursor")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let end = (start + page_size).min(ids.len());
        let results: Vec<Value> = ids[start.min(end)..end]
            .iter()
            .filter_map(|id| self.blocks.get(id).cloned())
            .collect();
        let has_more = end < ids.len();
        json!({
            "object": "list",
            "results": results,
            "next_cursor": if has_more { json!(end.to_string()) } else { Value::Null },
            "has_more": has_more
        })
    }

    fn append(&mut self, parent: &str, body: &Value) -> Value {
        let parent = simple(parent);
        let parent_ref = if self.containers.contains(&parent) {
            json!({"type": "page_id", "page_id": parent})
        } else {
            json!({"type": "block_id", "block_id": parent})
        };

        let mut position = match body.get("after").and_then(Value::as_str) {
            Some(after) => self
                .children
                .get(&parent)
                .and_then(|ids| ids.iter().position(|id| *id == simple(after)))
                .map(|i| i + 1),
            None => None,
        };

        let mut created = Vec::new();
        for child in body["children"].as_array().cloned().unwrap_or_default() {
            let mut child = child;
            let id = child
                .get("id")
                .and_then(Value::as_str)
                .map(simple)
                .unwrap_or_else(|| BlockId::new_v4().as_str().to_string());
            child["object"] = json!("block");
            child["id"] = json!(id);
            child["parent"] = parent_ref.clone();
            child["has_children"] = json!(false);
            child["archived"] = json!(false);

            let siblings = self.children.entry(parent.clone()).or_default();
            match position {
                Some(index) => {
                    siblings.insert(index, id.clone());
                    position = Some(index + 1);
                }
                None => siblings.push(id.clone()),
            }
            self.blocks.insert(id, child.clone());
            created.push(child);
        }

        if let Some(parent_block) = self.blocks.get_mut(&parent) {
            parent_block["has_children"] = json!(true);
        }

        json!({"object": "list", "results": created, "next_cursor": null, "has_more": false})
    }

    fn update_block(&mut self, id: &str, body: &Value) -> Result<Value, AppError> {
        let block = self
            .blocks
            .get_mut(&simple(id))
            .ok_or_else(|| not_found(id))?;
        merge(block, body);
        Ok(block.clone())
    }

    fn delete_block(&mut self, id: &str) -> Result<Value, AppError> {
        let id = simple(id);
        let block = self.blocks.get_mut(&id).ok_or_else(|| not_found(&id))?;
        block["archived"] = json!(true);
        let archived = block.clone();
        for siblings in self.children.values_mut() {
            siblings.retain(|child| *child != id);
        }
        Ok(archived)
    }

    fn create_page(&mut self, body: &Value) -> Value {
        let id = BlockId::new_v4().as_str().to_string();
        let page = json!({
            "object": "page",
            "id": id,
            "created_time": "2024-01-15T10:30:00.000Z",
            "last_edited_time": "2024-01-15T10:30:00.000Z",
            "parent": body["parent"].clone(),
            "archived": false,
            "url": format!("https://www.notion.so/{}", id),
            "properties": body["properties"].clone(),
        });
        self.containers.insert(id.clone());
        self.pages.insert(id.clone(), page.clone());
        self.page_order.push(id.clone());
        if body.get("children").is_some() {
            self.append(&id, &json!({"children": body["children"].clone()}));
        }
        page
    }

    fn create_database(&mut self, body: &Value) -> Value {
        let id = BlockId::new_v4().as_str().to_string();
        let database = json!({
            "object": "database",
            "id": id,
            "parent": body["parent"].clone(),
            "title": body["title"].clone(),
            "properties": body["properties"].clone(),
            "archived": false,
        });
        self.databases.insert(id, database.clone());
        database
    }

    fn page(&self, id: &str) -> Result<Value, AppError> {
        self.pages.get(&simple(id)).cloned().ok_or_else(|| not_found(id))
    }

    fn update_page(&mut self, id: &str, body: &Value) -> Result<Value, AppError> {
        let page = self.pages.get_mut(&simple(id)).ok_or_else(|| not_found(id))?;
        if let Some(archived) = body.get("archived") {
            page["archived"] = archived.clone();
        }
        if let Some(Value::Object(properties)) = body.get("properties") {
            for (name, value) in properties {
                page["properties"][name] = value.clone();
            }
        }
        Ok(page.clone())
    }

    /// Rows of `database`, filtered by a `contains` search filter if present.
    fn query(&self, database: &str, body: &Value) -> Value {
        let database = simple(database);
        let results: Vec<Value> = self
            .page_order
            .iter()
            .filter_map(|id| self.pages.get(id))
            .filter(|page| {
                page["parent"]["database_id"].as_str().map(simple) == Some(database.clone())
                    && !page["archived"].as_bool().unwrap_or(false)
            })
            .filter(|page| matches_filter(page, &body["filter"]))
            .cloned()
            .collect();
        json!({"object": "list", "results": results, "next_cursor": null, "has_more": false})
    }
}

fn matches_filter(page: &Value, filter: &Value) -> bool {
    if filter.is_null() {
        return true;
    }
    let (text, needle) = match filter.get("property").and_then(Value::as_str) {
        Some(property) => (
            property_text(&page["properties"][property]),
            filter["rich_text"]["contains"].as_str(),
        ),
        None => {
            let title = page["properties"]
                .as_object()
                .and_then(|props| props.values().find(|v| v.get("title").is_some()))
                .map(property_text)
                .unwrap_or_default();
            (title, filter["title"]["contains"].as_str())
        }
    };
    needle.map_or(true, |needle| text.contains(needle))
}

fn property_text(property: &Value) -> String {
    let runs = property
        .get("title")
        .or_else(|| property.get("rich_text"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    runs.iter()
        .filter_map(|run| run["text"]["content"].as_str())
        .collect()
}

/// Shallow-merges a partial update, one level into object payloads.
fn merge(target: &mut Value, update: &Value) {
    let Some(update) = update.as_object() else {
        return;
    };
    for (key, value) in update {
        let nested = value.is_object() && target.get(key).map_or(false, Value::is_object);
        if nested {
            if let (Some(Value::Object(existing)), Value::Object(changes)) =
                (target.get_mut(key), value)
            {
                for (k, v) in changes {
                    existing.insert(k.clone(), v.clone());
                }
            }
        } else {
            target[key] = value.clone();
        }
    }
}

fn simple(id: &str) -> String {
    id.replace('-', "").to_lowercase()
}

fn not_found(what: &str) -> AppError {
    RemoteError::new(
        404,
        NotionErrorCode::ObjectNotFound,
        format!("Could not find object with ID: {}", what),
    )
    .into()
}
