// Test mocks for the monitor pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockBillQuery (BillQuery) — keyed by (jurisdiction, search term), records every query
// - MockPageSource (PageSource) — HashMap-based URL→page, optional panicking URLs
// - MockChatModel (ChatModel) — fixed reply or failure, records every prompt
//
// Plus helpers for constructing bills and model replies.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use ai_client::{Message, ResponseMode};
use legiswatch_common::{Bill, BillSource, JurisdictionQuery};

use crate::traits::{BillQuery, ChatModel, FetchedPage, PageSource};

// ---------------------------------------------------------------------------
// MockBillQuery
// ---------------------------------------------------------------------------

type QueryKey = (String, Option<String>);

fn key_of(query: &JurisdictionQuery) -> QueryKey {
    (query.jurisdiction.clone(), query.search_term.clone())
}

/// Returns the registered bills for a (jurisdiction, term) pair and an empty
/// list for anything unregistered. Builder pattern: `.on_unfiltered()`,
/// `.on_keyword()`, `.failing_unfiltered()`, `.failing_keyword()`.
#[derive(Default)]
pub struct MockBillQuery {
    results: HashMap<QueryKey, Vec<Bill>>,
    failures: HashSet<QueryKey>,
    calls: Mutex<Vec<JurisdictionQuery>>,
}

impl MockBillQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_unfiltered(mut self, jurisdiction: &str, bills: Vec<Bill>) -> Self {
        self.results.insert((jurisdiction.to_string(), None), bills);
        self
    }

    pub fn on_keyword(mut self, jurisdiction: &str, term: &str, bills: Vec<Bill>) -> Self {
        self.results
            .insert((jurisdiction.to_string(), Some(term.to_string())), bills);
        self
    }

    pub fn failing_unfiltered(mut self, jurisdiction: &str) -> Self {
        self.failures.insert((jurisdiction.to_string(), None));
        self
    }

    pub fn failing_keyword(mut self, jurisdiction: &str, term: &str) -> Self {
        self.failures
            .insert((jurisdiction.to_string(), Some(term.to_string())));
        self
    }

    /// Every query issued so far, in order.
    pub fn calls(&self) -> Vec<JurisdictionQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillQuery for MockBillQuery {
    async fn query(&self, query: &JurisdictionQuery) -> Result<Vec<Bill>> {
        self.calls.lock().unwrap().push(query.clone());
        let key = key_of(query);
        if self.failures.contains(&key) {
            bail!("MockBillQuery: simulated failure for {query}");
        }
        Ok(self.results.get(&key).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockPageSource
// ---------------------------------------------------------------------------

/// HashMap-based page source. Returns `Err` for unregistered URLs and panics
/// for URLs registered with `.panicking()`.
#[derive(Default)]
pub struct MockPageSource {
    pages: HashMap<String, FetchedPage>,
    panicking: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_html(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), FetchedPage::html(html));
        self
    }

    pub fn on_text(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), FetchedPage::plain(text));
        self
    }

    pub fn panicking(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panicking.contains(url) {
            panic!("MockPageSource: simulated crash for {url}");
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("MockPageSource: no page registered for {url}"))
    }
}

// ---------------------------------------------------------------------------
// MockChatModel
// ---------------------------------------------------------------------------

enum Reply {
    Text(String),
    Fail(String),
}

/// Model stand-in with one fixed behaviour for every call.
pub struct MockChatModel {
    reply: Reply,
    prompts: Mutex<Vec<(Vec<Message>, ResponseMode)>>,
}

impl MockChatModel {
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(content.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Messages of every call, in order.
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(messages, _)| messages.clone())
            .collect()
    }

    pub fn modes(&self) -> Vec<ResponseMode> {
        self.prompts.lock().unwrap().iter().map(|(_, mode)| *mode).collect()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, messages: &[Message], mode: ResponseMode) -> Result<String> {
        self.prompts.lock().unwrap().push((messages.to_vec(), mode));
        match self.reply {
            Reply::Text(ref content) => Ok(content.clone()),
            Reply::Fail(ref message) => Err(anyhow!("{message}")),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub const CA: &str = "ocd-jurisdiction/country:us/state:ca/government";
pub const AL: &str = "ocd-jurisdiction/country:us/state:al/government";

pub fn keywords() -> Vec<String> {
    ["cryptocurrency", "digital asset", "blockchain"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// A bill with the given source URLs.
pub fn bill(id: &str, title: &str, urls: &[&str]) -> Bill {
    Bill {
        id: id.to_string(),
        identifier: id.to_uppercase(),
        title: title.to_string(),
        sources: urls.iter().map(|u| BillSource::new(*u)).collect(),
    }
}

/// A model reply with all five alert keys.
pub fn alert_json(title: &str, severity: &str) -> String {
    serde_json::json!({
        "title": title,
        "summary": format!("{title} summary"),
        "deadline": "2025-01-01",
        "action_required": format!("Assess {title}"),
        "severity": severity,
    })
    .to_string()
}

/// Shorthand for `Arc::new` when wiring mocks into `MonitorDeps`.
pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
