use std::sync::Arc;

use tracing::{info, warn};

use legiswatch_common::{Bill, JurisdictionQuery};

use crate::pacing::Pacer;
use crate::traits::BillQuery;

/// Walks the jurisdiction × keyword search space in priority order and stops
/// at the first query that yields bills.
///
/// For each jurisdiction: the unfiltered query first, then one query per
/// keyword. The next jurisdiction is tried only once every keyword for the
/// current one came back empty. Failed queries count as empty.
pub struct BillSearch {
    source: Arc<dyn BillQuery>,
    jurisdictions: Vec<String>,
    keywords: Vec<String>,
    pacer: Pacer,
}

impl BillSearch {
    pub fn new(
        source: Arc<dyn BillQuery>,
        jurisdictions: Vec<String>,
        keywords: Vec<String>,
        pacer: Pacer,
    ) -> Self {
        Self {
            source,
            jurisdictions,
            keywords,
            pacer,
        }
    }

    /// Every query in the order it would be tried.
    pub fn plan(&self) -> Vec<JurisdictionQuery> {
        self.jurisdictions
            .iter()
            .flat_map(|jurisdiction| {
                std::iter::once(JurisdictionQuery::unfiltered(jurisdiction)).chain(
                    self.keywords
                        .iter()
                        .map(move |term| JurisdictionQuery::keyword(jurisdiction, term)),
                )
            })
            .collect()
    }

    /// Returns the first non-empty result set, or an empty list when the
    /// whole space is exhausted. Never fails.
    ///
    /// A successful query returns without pausing. Every unsuccessful query
    /// that has a successor is followed by one pacing interval.
    pub async fn search(&self) -> Vec<Bill> {
        let plan = self.plan();
        let total = plan.len();

        for (attempt, query) in plan.iter().enumerate() {
            match self.source.query(query).await {
                Ok(bills) if !bills.is_empty() => {
                    info!(
                        count = bills.len(),
                        jurisdiction = %query.jurisdiction,
                        search_term = query.search_term.as_deref().unwrap_or(""),
                        attempt = attempt + 1,
                        "Retrieved bills"
                    );
                    return bills;
                }
                Ok(_) => {
                    info!(query = %query, "No bills for query");
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Bill query failed, treating as empty");
                }
            }

            if attempt + 1 < total {
                self.pacer.wait().await;
            }
        }

        warn!(queries = total, "Search space exhausted without finding bills");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::*;

    fn search_over(source: Arc<MockBillQuery>, pacer: Pacer) -> BillSearch {
        BillSearch::new(source, vec![CA.to_string(), AL.to_string()], keywords(), pacer)
    }

    #[test]
    fn plan_orders_unfiltered_then_keywords_per_jurisdiction() {
        let search = search_over(Arc::new(MockBillQuery::new()), Pacer::disabled());
        let plan = search.plan();

        assert_eq!(plan.len(), 8);
        assert_eq!(plan[0], JurisdictionQuery::unfiltered(CA));
        assert_eq!(plan[0].limit, 5);
        assert_eq!(plan[1], JurisdictionQuery::keyword(CA, "cryptocurrency"));
        assert_eq!(plan[1].limit, 10);
        assert_eq!(plan[3], JurisdictionQuery::keyword(CA, "blockchain"));
        assert_eq!(plan[4], JurisdictionQuery::unfiltered(AL));
        assert_eq!(plan[7], JurisdictionQuery::keyword(AL, "blockchain"));
    }

    #[tokio::test]
    async fn unfiltered_hit_returns_immediately() {
        let source = Arc::new(
            MockBillQuery::new()
                .on_unfiltered(CA, vec![bill("b1", "First", &[])])
                .on_keyword(CA, "cryptocurrency", vec![bill("b2", "Second", &[])]),
        );
        let bills = search_over(source.clone(), Pacer::disabled()).search().await;

        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].id, "b1");
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn keyword_hit_stops_further_queries() {
        let source = Arc::new(
            MockBillQuery::new()
                .on_keyword(CA, "digital asset", vec![bill("b1", "Asset Act", &[])])
                .on_keyword(CA, "blockchain", vec![bill("b2", "Chain Act", &[])])
                .on_unfiltered(AL, vec![bill("b3", "Alabama", &[])]),
        );
        let bills = search_over(source.clone(), Pacer::disabled()).search().await;

        assert_eq!(bills[0].id, "b1");
        let calls = source.calls();
        assert_eq!(
            calls,
            vec![
                JurisdictionQuery::unfiltered(CA),
                JurisdictionQuery::keyword(CA, "cryptocurrency"),
                JurisdictionQuery::keyword(CA, "digital asset"),
            ]
        );
    }

    #[tokio::test]
    async fn moves_to_next_jurisdiction_after_exhausting_keywords() {
        let source = Arc::new(
            MockBillQuery::new().on_keyword(AL, "cryptocurrency", vec![bill("b9", "AL Crypto", &[])]),
        );
        let bills = search_over(source.clone(), Pacer::disabled()).search().await;

        assert_eq!(bills[0].id, "b9");
        assert_eq!(source.calls().len(), 6);
        assert_eq!(source.calls()[4], JurisdictionQuery::unfiltered(AL));
    }

    #[tokio::test]
    async fn failures_are_treated_as_empty() {
        let source = Arc::new(
            MockBillQuery::new()
                .failing_unfiltered(CA)
                .failing_keyword(CA, "cryptocurrency")
                .on_keyword(CA, "digital asset", vec![bill("b1", "Asset Act", &[])]),
        );
        let bills = search_over(source.clone(), Pacer::disabled()).search().await;

        assert_eq!(bills[0].id, "b1");
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn exhausted_space_returns_empty() {
        let source = Arc::new(MockBillQuery::new().failing_unfiltered(AL));
        let bills = search_over(source.clone(), Pacer::disabled()).search().await;

        assert!(bills.is_empty());
        assert_eq!(source.calls().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_incurs_no_delay() {
        let source = Arc::new(MockBillQuery::new().on_unfiltered(CA, vec![bill("b1", "First", &[])]));
        let start = tokio::time::Instant::now();
        search_over(source, Pacer::new(Duration::from_secs(2))).search().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_after_each_unsuccessful_attempt() {
        let source = Arc::new(
            MockBillQuery::new().on_keyword(CA, "digital asset", vec![bill("b1", "Asset Act", &[])]),
        );
        let start = tokio::time::Instant::now();
        search_over(source, Pacer::new(Duration::from_secs(2))).search().await;

        // two misses before the hit
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn no_pause_after_the_final_attempt() {
        let source = Arc::new(MockBillQuery::new());
        let start = tokio::time::Instant::now();
        search_over(source, Pacer::new(Duration::from_secs(2))).search().await;

        assert_eq!(start.elapsed(), Duration::from_secs(14));
    }
}
