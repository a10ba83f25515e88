use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::TransportError;

/// JSON over HTTP, one call per invocation.
///
/// The controller only ever talks to the device through this trait, so tests
/// (or callers with their own HTTP stack) can plug in anything that can get
/// and post JSON documents.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET url` and parse the body as JSON.
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;

    /// `POST url` with `payload` as an `application/json` body and parse the
    /// JSON answer.
    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}

/// Default transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (proxy settings, TLS roots...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Value, TransportError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        debug!("GET {}", url);
        self.send(url, self.client.get(url).timeout(timeout)).await
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        debug!("POST {} {}", url, payload);
        // .json() sets Content-Type: application/json
        self.send(url, self.client.post(url).json(payload).timeout(timeout))
            .await
    }
}
