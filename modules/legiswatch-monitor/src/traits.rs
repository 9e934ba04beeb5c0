// Trait abstractions for the monitor's external collaborators.
//
// BillQuery — one search attempt against the legislative API.
// PageSource — raw document retrieval by URL.
// ChatModel — one completion from the language model.
//
// The production implementations wrap OpenStatesClient, reqwest and OpenAi.
// The mocks in `testing` stand in for them: no network, no API keys.

use anyhow::Result;
use async_trait::async_trait;

use ai_client::{Message, OpenAi, ResponseMode};
use legiswatch_common::{Bill, BillSource, JurisdictionQuery};
use openstates_client::{BillNode, BillsQuery, OpenStatesClient};

// ---------------------------------------------------------------------------
// BillQuery
// ---------------------------------------------------------------------------

#[async_trait]
pub trait BillQuery: Send + Sync {
    /// Run one query. Errors cover transport failures and malformed responses.
    async fn query(&self, query: &JurisdictionQuery) -> Result<Vec<Bill>>;
}

#[async_trait]
impl BillQuery for OpenStatesClient {
    async fn query(&self, query: &JurisdictionQuery) -> Result<Vec<Bill>> {
        let mut request = BillsQuery::new(&query.jurisdiction, query.limit);
        if let Some(ref term) = query.search_term {
            request = request.search(term);
        }
        let nodes = self.bills(&request).await?;
        Ok(nodes.into_iter().map(bill_from_node).collect())
    }
}

/// Convert an API record into a `Bill`, filling the placeholders used in
/// reports when the API omits a field.
pub fn bill_from_node(node: BillNode) -> Bill {
    Bill {
        id: node.id.unwrap_or_else(|| "unknown".to_string()),
        identifier: node.identifier.unwrap_or_default(),
        title: node.title.unwrap_or_else(|| "Unknown".to_string()),
        sources: node
            .sources
            .into_iter()
            .map(|s| BillSource { url: s.url })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// PageSource
// ---------------------------------------------------------------------------

/// A retrieved document before text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    pub content_type: Option<String>,
}

impl FetchedPage {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some("text/html".to_string()),
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some("text/plain".to_string()),
        }
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieve a document. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// ---------------------------------------------------------------------------
// ChatModel
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message], mode: ResponseMode) -> Result<String>;
    fn name(&self) -> &str;
}

#[async_trait]
impl ChatModel for OpenAi {
    async fn complete(&self, messages: &[Message], mode: ResponseMode) -> Result<String> {
        Ok(self.chat(messages, mode).await?)
    }

    fn name(&self) -> &str {
        self.model()
    }
}
