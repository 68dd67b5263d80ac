//! Content conversion collaborators
//!
//! The [`Converter`] trait is the seam between the crawl pipeline and
//! whatever turns a URL into Markdown text. The built-in [`HttpConverter`]
//! fetches over HTTP and normalizes HTML; callers with a richer document
//! pipeline can inject their own implementation into
//! [`Scraper`](crate::Scraper).

use crate::convert::{html_to_markdown, is_html};
use crate::error::ConvertError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::debug;

/// Per-URL fetch timeout
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
];

/// Converts a source URL into Markdown text
///
/// Implementations must treat every failure as terminal for that URL:
/// the orchestrator performs no retries.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert the content behind `url` to Markdown
    async fn convert(&self, url: &str) -> Result<String, ConvertError>;
}

/// Default HTTP converter
///
/// Fetches the URL with a bounded timeout, rejects non-success statuses
/// and binary content, converts HTML bodies to Markdown, and passes other
/// textual bodies through unchanged.
pub struct HttpConverter {
    user_agent: String,
}

impl HttpConverter {
    /// Create a converter with the default User-Agent
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a converter with a custom User-Agent
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Converter for HttpConverter {
    async fn convert(&self, url: &str) -> Result<String, ConvertError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, text/markdown, text/plain, */*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ConvertError::Request(e.to_string()))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(ConvertError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Err(ConvertError::BinaryContent(ct.clone()));
            }
        }

        let body = response.text().await.map_err(ConvertError::from_reqwest)?;

        let markdown = if is_html(content_type.as_deref(), &body) {
            html_to_markdown(&body)
        } else {
            body
        };

        if markdown.trim().is_empty() {
            return Err(ConvertError::EmptyDocument);
        }

        debug!(url, chars = markdown.chars().count(), "converted document");
        Ok(markdown)
    }
}

/// Check if a content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    BINARY_PREFIXES.iter().any(|prefix| ct.starts_with(prefix))
}
