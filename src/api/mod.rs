// src/api/mod.rs
//! Notion API interaction: the block tree, pages and databases.
//!
//! Every client talks to Notion through a [`NotionTransport`]. Business
//! logic depends on this trait, never on HTTP details, so the same clients
//! run against [`NotionHttpClient`] in production and an in-memory fake in
//! tests.

pub mod blocks;
pub mod client;
pub mod databases;
pub mod pages;
mod pagination;
pub mod query;
mod responses;
mod retrying;
pub mod workspace;

use crate::error::AppError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use blocks::{AppendOutcome, BlocksApi};
pub use client::NotionHttpClient;
pub use databases::DatabasesApi;
pub use pages::PagesApi;
pub use pagination::fetch_all_pages;
pub use retrying::RetryingTransport;
pub use workspace::NotionWorkspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// One call to the Notion REST API. `path` is relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path, Some(body))
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, None)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Whether sending the request twice has the same effect as once.
    ///
    /// Appending children and creating pages or databases are not; queries
    /// and searches are reads even though they are POSTs.
    pub fn is_idempotent(&self) -> bool {
        match self.method {
            HttpMethod::Get | HttpMethod::Delete => true,
            HttpMethod::Patch => !self.path.ends_with("/children"),
            HttpMethod::Post => self.path == "search" || self.path.ends_with("/query"),
        }
    }

    /// Value of a query parameter, if set.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// The ability to exchange JSON with the Notion API.
///
/// Implementations return the decoded body of a 2xx response and map any
/// other status to [`AppError::Remote`].
#[async_trait::async_trait]
pub trait NotionTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError>;
}

#[async_trait::async_trait]
impl<T: NotionTransport + ?Sized> NotionTransport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        (**self).send(request).await
    }
}
