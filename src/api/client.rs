// src/api/client.rs
//! HTTP transport for the Notion API.
//!
//! A thin wrapper around reqwest. It handles authentication, the version
//! header and status mapping, without any knowledge of blocks or pages.

use super::responses::{parse_body, remote_error};
use super::{ApiRequest, HttpMethod, NotionTransport};
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_VERSION};
use crate::error::AppError;
use crate::types::ApiKey;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A reqwest client preconfigured for one Notion integration.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    ///
    /// `timeout` applies to every request made through this client.
    pub fn new(api_key: &ApiKey, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = Client::builder().default_headers(Self::create_headers(api_key)?);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: NOTION_API_BASE_URL.to_string(),
        })
    }

    /// Points the client at another API root, such as a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn endpoint(&self, request: &ApiRequest) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, request.path))
            .map_err(|e| AppError::MissingConfiguration(format!("Invalid API URL: {}", e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl NotionTransport for NotionHttpClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        let url = self.endpoint(&request)?;
        log::debug!("{} {}", request.method, url);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Patch => self.client.patch(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_body(&body, &request.path)
        } else {
            let error = remote_error(status.as_u16(), &body, &request.path);
            log::debug!("{} failed: {}", request, error);
            Err(error.into())
        }
    }
}
