use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

use crate::traits::{FetchedPage, PageSource};

const FETCH_USER_AGENT: &str = "LegislativeMonitor/1.0";

/// Result of fetching one bill document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Visible text of the document. Never blank.
    Text(String),
    /// Nothing usable came back. Terminal for the bill; callers do not retry.
    NoContent(String),
}

impl FetchOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            FetchOutcome::Text(text) => Some(text),
            FetchOutcome::NoContent(_) => None,
        }
    }
}

// --- Content fetcher ---

/// Retrieves bill documents and reduces them to plain text.
/// Every failure is absorbed into `FetchOutcome::NoContent` with a log line.
pub struct ContentFetcher {
    pages: Arc<dyn PageSource>,
}

impl ContentFetcher {
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self { pages }
    }

    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let parsed = match url::Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => parsed,
            Ok(parsed) => {
                return no_content(url, format!("unsupported URL scheme: {}", parsed.scheme()))
            }
            Err(e) => return no_content(url, format!("invalid URL: {e}")),
        };

        let page = match self.pages.fetch(url).await {
            Ok(page) => page,
            Err(e) => return no_content(url, format!("{e:#}")),
        };

        // Servers mislabel bill HTML as text/plain, so the body decides.
        let text = if looks_like_markup(&page.body) {
            extract_text(&page.body, Some(&parsed))
        } else {
            page.body
        };

        if text.trim().is_empty() {
            return no_content(url, "document has no extractable text".to_string());
        }

        info!(
            url,
            content_type = page.content_type.as_deref().unwrap_or("unknown"),
            chars = text.chars().count(),
            "Fetched bill content"
        );
        FetchOutcome::Text(text)
    }
}

fn no_content(url: &str, reason: String) -> FetchOutcome {
    warn!(url, reason = %reason, "No content retrieved");
    FetchOutcome::NoContent(reason)
}

/// Whether the body contains anything shaped like a tag, comment or doctype.
fn looks_like_markup(body: &str) -> bool {
    body.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'/' || w[1] == b'!'))
}

/// Strip markup and return the visible text of an HTML document.
///
/// Readability is off: bill pages are mostly the bill text itself and the
/// main-content heuristics tend to drop sections of it.
pub fn extract_text(html: &str, url: Option<&url::Url>) -> String {
    let config = TransformConfig {
        readability: false,
        main_content: false,
        return_format: ReturnFormat::Text,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url,
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

// --- HTTP page source ---

/// Plain HTTP retrieval with a fixed per-request timeout.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(FETCH_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} from {url}", status.as_u16());
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;

        Ok(FetchedPage { body, content_type })
    }
}
