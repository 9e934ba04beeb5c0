use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

use ai_client::OpenAi;
use legiswatch_common::config::{
    DEFAULT_JURISDICTIONS, DEFAULT_KEYWORDS, DEFAULT_RATE_LIMIT_DELAY,
};
use legiswatch_common::{Bill, BillOutcome, Config, LegisWatchError};
use openstates_client::OpenStatesClient;

use crate::alert::AlertGenerator;
use crate::fetcher::{ContentFetcher, FetchOutcome, HttpPageSource};
use crate::pacing::Pacer;
use crate::search::BillSearch;
use crate::traits::{BillQuery, ChatModel, PageSource};

/// Collaborators and settings for one monitor.
///
/// Holds the long-lived clients; the monitor owns exactly one of each and
/// every bill in a run goes through the same instances.
#[derive(Clone, TypedBuilder)]
pub struct MonitorDeps {
    pub bills: Arc<dyn BillQuery>,
    pub pages: Arc<dyn PageSource>,
    pub model: Arc<dyn ChatModel>,
    #[builder(default = DEFAULT_JURISDICTIONS.iter().map(|j| j.to_string()).collect::<Vec<_>>())]
    pub jurisdictions: Vec<String>,
    #[builder(default = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect::<Vec<_>>())]
    pub keywords: Vec<String>,
    #[builder(default = DEFAULT_RATE_LIMIT_DELAY)]
    pub rate_limit_delay: Duration,
}

impl MonitorDeps {
    /// Wire the production clients from configuration. No network calls are made.
    pub fn from_config(config: &Config) -> Result<Self, LegisWatchError> {
        let openstates = OpenStatesClient::new(&config.openstates_key, config.request_timeout)
            .map_err(|e| LegisWatchError::Config(format!("OpenStates client: {e}")))?;
        let pages = HttpPageSource::new(config.request_timeout)?;
        let mut model = OpenAi::new(&config.openai_api_key, &config.model)
            .map_err(|e| LegisWatchError::Config(format!("OpenAI client: {e}")))?;
        if let Some(ref base_url) = config.openai_base_url {
            model = model.with_base_url(base_url);
        }

        Ok(Self::builder()
            .bills(Arc::new(openstates))
            .pages(Arc::new(pages))
            .model(Arc::new(model))
            .jurisdictions(config.jurisdictions.clone())
            .keywords(config.keywords.clone())
            .rate_limit_delay(config.rate_limit_delay)
            .build())
    }
}

/// Failure confined to a single bill.
#[derive(Debug, Error)]
pub enum BillError {
    #[error("panic while processing bill: {0}")]
    Panicked(String),
}

/// Search → fetch → generate → classify, one bill at a time.
pub struct Monitor {
    search: BillSearch,
    fetcher: ContentFetcher,
    generator: AlertGenerator,
    pacer: Pacer,
}

impl Monitor {
    pub fn new(deps: MonitorDeps) -> Self {
        let pacer = Pacer::new(deps.rate_limit_delay);
        Self {
            search: BillSearch::new(deps.bills, deps.jurisdictions, deps.keywords, pacer),
            fetcher: ContentFetcher::new(deps.pages),
            generator: AlertGenerator::new(deps.model),
            pacer,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, LegisWatchError> {
        Ok(Self::new(MonitorDeps::from_config(config)?))
    }

    /// Run the search strategy on its own.
    pub async fn search(&self) -> Vec<Bill> {
        self.search.search().await
    }

    /// Full pass. Fails only when the search finds nothing at all.
    pub async fn run(&self) -> Result<Vec<BillOutcome>, LegisWatchError> {
        let bills = self.search.search().await;
        if bills.is_empty() {
            return Err(LegisWatchError::NoBillsFound {
                attempts: self.search.plan().len(),
            });
        }

        info!(count = bills.len(), "Processing bills");
        Ok(self.process_bills(&bills).await)
    }

    /// Classify every bill, in order. Exactly one outcome per bill.
    ///
    /// Bills that call out (fetch + generate) are separated by one pacing
    /// interval; bills settled locally neither wait nor cause a wait.
    pub async fn process_bills(&self, bills: &[Bill]) -> Vec<BillOutcome> {
        let mut outcomes = Vec::with_capacity(bills.len());
        let mut called_out = false;

        for bill in bills {
            let calls_out = matches!(bill.primary_source(), Some(Some(_)));
            if calls_out && called_out {
                self.pacer.wait().await;
            }
            called_out |= calls_out;

            let outcome = match AssertUnwindSafe(self.process_bill(bill))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => bill_error(bill, BillError::Panicked(panic_message(panic.as_ref()))),
            };

            info!(
                bill_id = %outcome.bill_id,
                title = %outcome.title,
                status = %outcome.status,
                "Processed bill"
            );
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn process_bill(&self, bill: &Bill) -> BillOutcome {
        let url = match bill.primary_source() {
            None => {
                info!(title = %bill.title, "No sources found for bill");
                return BillOutcome::no_sources(bill);
            }
            Some(None) => {
                warn!(bill_id = %bill.id, title = %bill.title, "First source has no URL");
                return BillOutcome::no_content(bill);
            }
            Some(Some(url)) => url,
        };

        info!(title = %bill.title, url, "Processing bill");

        let content = match self.fetcher.fetch(url).await {
            FetchOutcome::Text(text) => text,
            FetchOutcome::NoContent(_) => return BillOutcome::no_content(bill),
        };

        let generation = self.generator.generate(&bill.title, &content).await;
        if generation.is_fallback() {
            BillOutcome::processed_fallback(bill, generation.into_alert(), url)
        } else {
            BillOutcome::processed(bill, generation.into_alert(), url)
        }
    }
}

fn bill_error(bill: &Bill, error: BillError) -> BillOutcome {
    warn!(bill_id = %bill.id, title = %bill.title, error = %error, "Error processing bill");
    BillOutcome::error(bill, error.to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use legiswatch_common::{BillStatus, ComplianceAlert, Severity};

    fn monitor(bills: MockBillQuery, pages: MockPageSource, model: MockChatModel) -> Monitor {
        Monitor::new(
            MonitorDeps::builder()
                .bills(Arc::new(bills))
                .pages(Arc::new(pages))
                .model(Arc::new(model))
                .jurisdictions(vec![CA.to_string(), AL.to_string()])
                .keywords(keywords())
                .rate_limit_delay(Duration::ZERO)
                .build(),
        )
    }

    #[tokio::test]
    async fn bill_without_sources_makes_no_calls() {
        let pages = shared(MockPageSource::new());
        let model = shared(MockChatModel::replying(alert_json("T", "High")));
        let monitor = Monitor::new(
            MonitorDeps::builder()
                .bills(Arc::new(MockBillQuery::new()))
                .pages(pages.clone())
                .model(model.clone())
                .rate_limit_delay(Duration::ZERO)
                .build(),
        );

        let outcomes = monitor.process_bills(&[bill("b1", "Sourceless", &[])]).await;

        assert_eq!(outcomes[0].status, BillStatus::NoSources);
        assert!(outcomes[0].alert.is_none());
        assert!(pages.calls().is_empty());
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_document_is_no_content() {
        let m = monitor(
            MockBillQuery::new(),
            MockPageSource::new().on_text("https://leg.example/ab1", ""),
            MockChatModel::replying(alert_json("T", "High")),
        );
        let outcomes = m
            .process_bills(&[bill("b1", "Blank", &["https://leg.example/ab1"])])
            .await;

        assert_eq!(outcomes[0].status, BillStatus::NoContent);
        assert!(outcomes[0].alert.is_none());
        assert!(outcomes[0].url.is_none());
    }

    #[tokio::test]
    async fn processed_bill_carries_alert_and_first_url() {
        let m = monitor(
            MockBillQuery::new(),
            MockPageSource::new().on_text("https://leg.example/ab1", "SECTION 1."),
            MockChatModel::replying(
                r#"{"title":"T","summary":"S","deadline":"D","action_required":"A","severity":"High"}"#,
            ),
        );
        let outcomes = m
            .process_bills(&[bill(
                "b1",
                "Crypto Act",
                &["https://leg.example/ab1", "https://leg.example/ab1-alt"],
            )])
            .await;

        let outcome = &outcomes[0];
        assert_eq!(outcome.status, BillStatus::Processed);
        assert_eq!(outcome.url.as_deref(), Some("https://leg.example/ab1"));
        assert!(!outcome.fallback_alert);
        assert_eq!(
            outcome.alert,
            Some(ComplianceAlert {
                title: "T".to_string(),
                summary: "S".to_string(),
                deadline: "D".to_string(),
                action_required: "A".to_string(),
                severity: Severity::High,
            })
        );
    }

    #[tokio::test]
    async fn unusable_first_url_is_no_content() {
        let mut null_url = bill("a", "Null Url", &[]);
        null_url.sources.push(legiswatch_common::BillSource { url: None });
        let blank_url = bill("b", "Blank Url", &["   "]);
        let malformed_url = bill("c", "Malformed Url", &["not a url"]);

        let pages = shared(MockPageSource::new().on_text("https://leg.example/ab2", "text"));
        let m = Monitor::new(
            MonitorDeps::builder()
                .bills(Arc::new(MockBillQuery::new()))
                .pages(pages.clone())
                .model(Arc::new(MockChatModel::replying(alert_json("T", "Low"))))
                .rate_limit_delay(Duration::ZERO)
                .build(),
        );
        let outcomes = m
            .process_bills(&[
                null_url,
                blank_url,
                malformed_url,
                bill("d", "Fine", &["https://leg.example/ab2"]),
            ])
            .await;

        let statuses: Vec<BillStatus> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                BillStatus::NoContent,
                BillStatus::NoContent,
                BillStatus::NoContent,
                BillStatus::Processed,
            ]
        );
        assert!(outcomes[..3].iter().all(|o| o.error.is_none() && o.alert.is_none()));
        assert_eq!(pages.calls(), vec!["https://leg.example/ab2".to_string()]);
    }

    #[tokio::test]
    async fn fallback_generation_is_flagged_on_the_outcome() {
        let m = monitor(
            MockBillQuery::new(),
            MockPageSource::new().on_text("https://leg.example/ab1", "SECTION 1."),
            MockChatModel::failing("model unavailable"),
        );
        let outcomes = m
            .process_bills(&[bill("b1", "Crypto Act", &["https://leg.example/ab1"])])
            .await;

        assert_eq!(outcomes[0].status, BillStatus::Processed);
        assert!(outcomes[0].fallback_alert);
        assert_eq!(outcomes[0].alert, Some(ComplianceAlert::fallback("Crypto Act")));
    }

    #[tokio::test]
    async fn empty_search_is_fatal() {
        let m = monitor(
            MockBillQuery::new(),
            MockPageSource::new(),
            MockChatModel::replying("{}"),
        );

        let err = m.run().await.unwrap_err();
        assert!(matches!(err, LegisWatchError::NoBillsFound { attempts: 8 }));
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
