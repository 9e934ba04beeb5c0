mod client;
pub(crate) mod types;

use std::time::Duration;

use crate::error::{AiError, Result};
use crate::traits::{Message, ResponseMode};

use client::OpenAiClient;

/// Model requests are bounded so a stalled completion cannot hang a run.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, model, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http,
        })
    }

    /// Point the client at an OpenAI-compatible endpoint (self-hosted or proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Send a conversation and return the first choice's content.
    pub async fn chat(&self, messages: &[Message], mode: ResponseMode) -> Result<String> {
        let mut request = types::ChatRequest::new(&self.model)
            .messages(messages.iter().map(types::WireMessage::from));

        if types::uses_max_completion_tokens(&self.model) {
            request = request.max_completion_tokens(4096);
        } else {
            request = request.max_tokens(4096).temperature(0.0);
        }

        if mode == ResponseMode::JsonObject {
            request = request.json_object();
        }

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AiError::EmptyResponse)
    }
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
