// src/api/databases.rs
//! Database CRUD, queries and search.

use super::query::{create_search_filter, DatabaseQuery, Sort};
use super::responses::decode;
use super::{ApiRequest, NotionTransport};
use crate::error::Result;
use crate::model::{Database, Page, Paginated, Schema};
use crate::types::{DatabaseId, PageId, RichText};
use serde_json::{json, Value};
use std::sync::Arc;

/// Client for the `databases` endpoints and database search.
#[derive(Clone)]
pub struct DatabasesApi {
    transport: Arc<dyn NotionTransport>,
}

impl DatabasesApi {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self { transport }
    }

    async fn call(&self, request: ApiRequest, operation: &str, id: &str) -> Result<Value> {
        self.transport.send(request).await.map_err(|e| {
            log::error!("{} failed for {}: {}", operation, id, e);
            e
        })
    }

    /// Creates an inline database under `parent` with the given schema.
    pub async fn create_database(
        &self,
        parent: &PageId,
        title: &str,
        properties: &Schema,
    ) -> Result<Database> {
        let title = RichText::new(title, None, None)?;
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent },
            "title": [title],
            "properties": properties,
        });
        let value = self
            .call(ApiRequest::post("databases", body), "create_database", parent.as_str())
            .await?;
        let database: Database = decode(value, "databases")?;
        log::info!("Created database {} ({})", database.title_text(), database.id);
        Ok(database)
    }

    pub async fn get_database(&self, id: &DatabaseId) -> Result<Database> {
        let path = format!("databases/{}", id);
        let value = self
            .call(ApiRequest::get(&path), "get_database", id.as_str())
            .await?;
        decode(value, &path)
    }

    /// Sends a partial database update (title, description or schema) as is.
    pub async fn update_database(&self, id: &DatabaseId, changes: &Value) -> Result<Database> {
        let path = format!("databases/{}", id);
        let value = self
            .call(
                ApiRequest::patch(&path, changes.clone()),
                "update_database",
                id.as_str(),
            )
            .await?;
        decode(value, &path)
    }

    /// One page of rows matching `query`.
    pub async fn query_database(
        &self,
        id: &DatabaseId,
        query: &DatabaseQuery,
    ) -> Result<Paginated<Page>> {
        let path = format!("databases/{}/query", id);
        let value = self
            .call(
                ApiRequest::post(&path, json!(query)),
                "query_database",
                id.as_str(),
            )
            .await?;
        decode(value, &path)
    }

    /// Databases shared with the integration.
    pub async fn list_databases(
        &self,
        page_size: u32,
        start_cursor: Option<&str>,
    ) -> Result<Paginated<Database>> {
        let mut body = json!({
            "filter": { "value": "database", "property": "object" },
            "page_size": page_size,
        });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }
        let value = self
            .call(ApiRequest::post("search", body), "list_databases", "workspace")
            .await?;
        decode(value, "search")
    }

    /// Rows whose `property` (or title) contains `query`, optionally sorted.
    pub async fn search_database(
        &self,
        id: &DatabaseId,
        query: &str,
        property: Option<&str>,
        sort: Option<Sort>,
        start_cursor: Option<String>,
        page_size: u32,
    ) -> Result<Paginated<Page>> {
        let mut request = DatabaseQuery::default()
            .with_filter(create_search_filter(query, property))
            .starting_at(start_cursor)
            .with_page_size(page_size);
        if let Some(sort) = sort {
            request = request.with_sort(sort);
        }
        log::debug!("Searching database {} for '{}'", id, query);
        self.query_database(id, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::create_sort;
    use crate::error::AppError;
    use crate::model::todo_database_schema;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    const DATABASE_ID: &str = "d9824bdc84454327be8b5b47500af6ce";

    struct Recorder {
        requests: Mutex<Vec<ApiRequest>>,
        reply: Value,
    }

    impl Recorder {
        fn replying(reply: Value) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply,
            })
        }
    }

    #[async_trait::async_trait]
    impl NotionTransport for Recorder {
        async fn send(&self, request: ApiRequest) -> std::result::Result<Value, AppError> {
            self.requests.lock().push(request);
            Ok(self.reply.clone())
        }
    }

    fn empty_list() -> Value {
        json!({"object": "list", "results": [], "next_cursor": null, "has_more": false})
    }

    #[tokio::test]
    async fn search_composes_filter_sort_and_paging() {
        let recorder = Recorder::replying(empty_list());
        let api = DatabasesApi::new(recorder.clone());
        let id = DatabaseId::parse(DATABASE_ID).unwrap();

        api.search_database(
            &id,
            "milk",
            Some("Task"),
            Some(create_sort("Due Date", "ascending").unwrap()),
            None,
            100,
        )
        .await
        .unwrap();

        let requests = recorder.requests.lock();
        assert_eq!(requests[0].path, format!("databases/{}/query", DATABASE_ID));
        assert_eq!(
            requests[0].body,
            Some(json!({
                "filter": {"property": "Task", "rich_text": {"contains": "milk"}},
                "sorts": [{"property": "Due Date", "direction": "ascending"}],
                "page_size": 100
            }))
        );
    }

    #[tokio::test]
    async fn list_databases_filters_search_by_object() {
        let recorder = Recorder::replying(empty_list());
        let api = DatabasesApi::new(recorder.clone());
        let listed = api.list_databases(100, None).await.unwrap();

        assert!(listed.results.is_empty());
        let requests = recorder.requests.lock();
        assert_eq!(requests[0].path, "search");
        assert_eq!(
            requests[0].body.as_ref().unwrap()["filter"],
            json!({"value": "database", "property": "object"})
        );
    }

    #[tokio::test]
    async fn create_database_sends_parent_title_and_schema() {
        let recorder = Recorder::replying(json!({
            "object": "database",
            "id": DATABASE_ID,
            "title": [{"type": "text", "text": {"content": "Todos"}, "plain_text": "Todos"}],
            "properties": {}
        }));
        let api = DatabasesApi::new(recorder.clone());
        let parent = PageId::parse("b55c9c91-384d-452b-81db-d1ef79372b75").unwrap();

        let database = api
            .create_database(&parent, "Todos", &todo_database_schema())
            .await
            .unwrap();
        assert_eq!(database.title_text(), "Todos");

        let requests = recorder.requests.lock();
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["parent"]["page_id"], "b55c9c91384d452b81dbd1ef79372b75");
        assert_eq!(body["title"][0]["text"]["content"], "Todos");
        assert_eq!(body["properties"]["Task"], json!({"type": "title", "title": {}}));
    }
}
