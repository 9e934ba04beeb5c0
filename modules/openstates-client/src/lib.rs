pub mod error;
pub mod types;

pub use error::{OpenStatesError, Result};
pub use types::{BillNode, BillsQuery, SourceLink};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use types::{BillsData, GraphQlRequest, GraphQlResponse};

const GRAPHQL_URL: &str = "https://openstates.org/graphql";
const CLIENT_USER_AGENT: &str = "LegislativeMonitor/1.0";

pub struct OpenStatesClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenStatesClient {
    /// Build a client authenticated with `api_key`. Every request is bounded by `timeout`.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| OpenStatesError::InvalidKey(e.to_string()))?;
        headers.insert("X-API-KEY", key);
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: GRAPHQL_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a `bills` query and return the edge nodes in API order.
    pub async fn bills(&self, query: &BillsQuery) -> Result<Vec<BillNode>> {
        tracing::debug!(
            jurisdiction = %query.jurisdiction,
            search_term = query.search_term.as_deref().unwrap_or(""),
            first = query.first,
            "OpenStates bills query"
        );

        let request = GraphQlRequest {
            query: query.to_graphql(),
        };

        let resp = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenStatesError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let gql: GraphQlResponse<BillsData> = serde_json::from_str(&body)?;

        if !gql.errors.is_empty() {
            let messages: Vec<String> = gql.errors.into_iter().map(|e| e.message).collect();
            return Err(OpenStatesError::GraphQl(messages.join("; ")));
        }

        let nodes = gql
            .data
            .and_then(|d| d.bills)
            .map(|conn| conn.edges.into_iter().map(|edge| edge.node).collect())
            .unwrap_or_default();

        Ok(nodes)
    }
}
