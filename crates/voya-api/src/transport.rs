//! HTTP transport for the chat backend

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_stream::Stream;

use crate::error::{Error, Result};
use crate::types::{ChatRequest, ChatResponse};

/// Default per-request timeout. LLM-backed turns are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A stream of raw body chunks from the backend
pub type ByteChunkStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes>> + Send>>;

/// Retry configuration for establishing the request
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate delay for a given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_secs =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Transport for one chat turn. The controller hands over a session id, a
/// message, and an optional selected-option echo; base URL, headers, timeout,
/// and retry policy live here.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST one turn and stream the response body chunk by chunk
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ByteChunkStream>;

    /// POST one turn and buffer the whole response
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }

    /// Issue the POST, retrying retryable failures with backoff. Retrying is
    /// only safe here, before any body byte has been consumed.
    async fn post_chat(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let url = self.chat_url();
        let mut attempt = 0u32;

        loop {
            let result = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);

            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let error = Error::from(e);
                    if attempt < self.retry.max_retries && error.is_retryable() {
                        let delay = self.retry.delay_for_attempt(attempt);
                        tracing::warn!(
                            "chat request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt + 1,
                            self.retry.max_retries + 1,
                            error,
                            delay
                        );
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ByteChunkStream> {
        let response = self.post_chat(request).await?;
        let chunks = response.bytes_stream().map(|chunk| chunk.map_err(Error::from));
        Ok(Box::pin(chunks))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.post_chat(request).await?;
        Ok(response.json::<ChatResponse>().await?)
    }
}
