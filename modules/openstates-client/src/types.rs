use serde::{Deserialize, Serialize};

// --- Query ---

/// Parameters for one `bills(...)` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillsQuery {
    /// OCD jurisdiction id, e.g. `ocd-jurisdiction/country:us/state:ca/government`.
    pub jurisdiction: String,
    pub search_term: Option<String>,
    pub first: u32,
}

impl BillsQuery {
    pub fn new(jurisdiction: impl Into<String>, first: u32) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            search_term: None,
            first,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// Render the GraphQL document. String arguments are emitted as JSON
    /// string literals, which GraphQL accepts verbatim.
    pub fn to_graphql(&self) -> String {
        let search_filter = match self.search_term {
            Some(ref term) => format!(", searchQuery: {}", quote(term)),
            None => String::new(),
        };
        format!(
            "query {{ bills(jurisdiction: {}, first: {}{}) {{ edges {{ node {{ id identifier title sources {{ url }} }} }} }} }}",
            quote(&self.jurisdiction),
            self.first,
            search_filter
        )
    }
}

fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

// --- GraphQL envelope ---

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GraphQlRequest {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlErrorEntry {
    pub message: String,
}

// --- Bills payload ---

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BillsData {
    pub bills: Option<BillConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BillConnection {
    #[serde(default)]
    pub edges: Vec<BillEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BillEdge {
    pub node: BillNode,
}

/// A bill as returned by OpenStates. Fields the API may omit are optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillNode {
    pub id: Option<String>,
    pub identifier: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<SourceLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceLink {
    pub url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<SourceLink>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<SourceLink>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_query_has_no_search_argument() {
        let gql = BillsQuery::new("ocd-jurisdiction/country:us/state:ca/government", 5).to_graphql();
        assert!(gql.contains(r#"jurisdiction: "ocd-jurisdiction/country:us/state:ca/government""#));
        assert!(gql.contains("first: 5"));
        assert!(!gql.contains("searchQuery"));
    }

    #[test]
    fn search_term_is_escaped() {
        let gql = BillsQuery::new("ca", 10)
            .search(r#"digital "asset""#)
            .to_graphql();
        assert!(gql.contains(r#"searchQuery: "digital \"asset\"""#));
        assert!(gql.contains("first: 10"));
    }

    #[test]
    fn bill_node_tolerates_missing_fields() {
        let node: BillNode = serde_json::from_str(r#"{"id": "ocd-bill/1", "sources": null}"#).unwrap();
        assert_eq!(node.id.as_deref(), Some("ocd-bill/1"));
        assert!(node.title.is_none());
        assert!(node.sources.is_empty());

        let node: BillNode =
            serde_json::from_str(r#"{"id": "ocd-bill/2", "sources": [{}]}"#).unwrap();
        assert_eq!(node.sources, vec![SourceLink { url: None }]);
    }
}
