use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use legiswatch_common::{BillOutcome, LegisWatchError, Severity};

const FILE_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// High-severity bill listed in the summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionItem {
    pub title: String,
    pub action_required: String,
}

/// Human-readable digest of a run: severity counts and the bills that need
/// immediate attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_bills: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub attention: Vec<AttentionItem>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[BillOutcome]) -> Self {
        let count = |severity: Severity| {
            outcomes
                .iter()
                .filter(|o| o.severity() == Some(severity))
                .count()
        };

        let attention = outcomes
            .iter()
            .filter_map(|o| o.alert.as_ref().map(|alert| (o, alert)))
            .filter(|(_, alert)| alert.severity == Severity::High)
            .map(|(o, alert)| AttentionItem {
                title: o.title.clone(),
                action_required: if alert.action_required.trim().is_empty() {
                    "Review required".to_string()
                } else {
                    alert.action_required.clone()
                },
            })
            .collect();

        Self {
            total_bills: outcomes.len(),
            high_severity: count(Severity::High),
            medium_severity: count(Severity::Medium),
            attention,
        }
    }

    pub fn render(&self, generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Legislative Monitor Summary Report");
        let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Bills Processed: {}", self.total_bills);
        let _ = writeln!(out, "High Severity Alerts: {}", self.high_severity);
        let _ = writeln!(out, "Medium Severity Alerts: {}", self.medium_severity);
        let _ = writeln!(out);
        let _ = writeln!(out, "Bills requiring immediate attention:");
        for item in &self.attention {
            let _ = writeln!(out, "- {}: {}", item.title, item.action_required);
        }
        out
    }
}

/// Paths written by one `ReportWriter::write` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub alerts: PathBuf,
    pub summary: PathBuf,
}

/// Writes the outcome list as JSON and the summary as text, both stamped
/// with the run time.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(
        &self,
        outcomes: &[BillOutcome],
        now: DateTime<Local>,
    ) -> Result<ReportPaths, LegisWatchError> {
        std::fs::create_dir_all(&self.dir)?;
        let stamp = now.format(FILE_TIMESTAMP);

        let alerts = self.dir.join(format!("legislative_alerts_{stamp}.json"));
        std::fs::write(&alerts, serde_json::to_string_pretty(outcomes)?)?;
        info!(path = %alerts.display(), count = outcomes.len(), "Results saved");

        let summary = self.dir.join(format!("summary_report_{stamp}.txt"));
        std::fs::write(&summary, RunSummary::from_outcomes(outcomes).render(now))?;
        info!(path = %summary.display(), "Summary report saved");

        Ok(ReportPaths { alerts, summary })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::bill;
    use legiswatch_common::ComplianceAlert;

    fn alert(severity: Severity, action: &str) -> ComplianceAlert {
        ComplianceAlert {
            title: "t".to_string(),
            summary: "s".to_string(),
            deadline: "d".to_string(),
            action_required: action.to_string(),
            severity,
        }
    }

    fn outcomes() -> Vec<BillOutcome> {
        vec![
            BillOutcome::processed(&bill("b1", "Crypto Act", &[]), alert(Severity::High, "File notice"), "u1"),
            BillOutcome::processed(&bill("b2", "Ledger Act", &[]), alert(Severity::Medium, "Watch"), "u2"),
            BillOutcome::processed(&bill("b3", "Token Act", &[]), alert(Severity::High, ""), "u3"),
            BillOutcome::no_sources(&bill("b4", "Empty Act", &[])),
            BillOutcome::error(&bill("b5", "Broken Act", &[]), "boom"),
        ]
    }

    #[test]
    fn summary_counts_severities_and_lists_high() {
        let summary = RunSummary::from_outcomes(&outcomes());

        assert_eq!(summary.total_bills, 5);
        assert_eq!(summary.high_severity, 2);
        assert_eq!(summary.medium_severity, 1);
        assert_eq!(
            summary.attention,
            vec![
                AttentionItem {
                    title: "Crypto Act".to_string(),
                    action_required: "File notice".to_string(),
                },
                AttentionItem {
                    title: "Token Act".to_string(),
                    action_required: "Review required".to_string(),
                },
            ]
        );
    }

    #[test]
    fn render_includes_timestamp_and_attention_list() {
        let at = Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let text = RunSummary::from_outcomes(&outcomes()).render(at);

        assert!(text.contains("Generated: 2025-03-04 05:06:07"));
        assert!(text.contains("High Severity Alerts: 2"));
        assert!(text.contains("- Crypto Act: File notice\n"));
    }

    #[test]
    fn writer_creates_timestamped_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));
        let at = Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();

        let paths = writer.write(&outcomes(), at).unwrap();

        assert!(paths.alerts.ends_with("legislative_alerts_20250304_050607.json"));
        assert!(paths.summary.ends_with("summary_report_20250304_050607.txt"));

        let json = std::fs::read_to_string(&paths.alerts).unwrap();
        let parsed: Vec<BillOutcome> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcomes());

        let text = std::fs::read_to_string(&paths.summary).unwrap();
        assert!(text.starts_with("Legislative Monitor Summary Report"));
    }
}
