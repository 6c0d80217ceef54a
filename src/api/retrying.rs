// src/api/retrying.rs
use super::{ApiRequest, NotionTransport};
use crate::error::AppError;
use crate::error_recovery::{retry_with_backoff, retry_with_backoff_if, RetryPolicy};
use serde_json::Value;

/// Wraps a transport so transient failures are retried with backoff.
///
/// Authentication and other client errors pass straight through. Writes
/// that are not idempotent (appends, page and database creation) are only
/// retried after a rate-limit rejection; a dropped connection or a 5xx may
/// mean the write already landed.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: NotionTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl<T: NotionTransport> NotionTransport for RetryingTransport<T> {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        if request.is_idempotent() {
            retry_with_backoff(self.policy, || self.inner.send(request.clone())).await
        } else {
            retry_with_backoff_if(self.policy, AppError::is_rate_limited, || {
                self.inner.send(request.clone())
            })
            .await
        }
    }
}
