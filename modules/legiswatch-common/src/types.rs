use serde::{Deserialize, Serialize};

// --- Bills ---

/// A legislative bill as found by the search strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub sources: Vec<BillSource>,
}

impl Bill {
    /// URL of the first listed source document.
    ///
    /// `None` when the bill has no sources; `Some(None)` when the first source
    /// carries no usable URL.
    pub fn primary_source(&self) -> Option<Option<&str>> {
        self.sources.first().map(|s| {
            s.url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSource {
    pub url: Option<String>,
}

impl BillSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Result limit for the unfiltered per-jurisdiction query.
pub const UNFILTERED_LIMIT: u32 = 5;
/// Result limit for keyword-filtered queries.
pub const KEYWORD_LIMIT: u32 = 10;

/// One search attempt against the legislative API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisdictionQuery {
    pub jurisdiction: String,
    pub search_term: Option<String>,
    pub limit: u32,
}

impl JurisdictionQuery {
    pub fn unfiltered(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            search_term: None,
            limit: UNFILTERED_LIMIT,
        }
    }

    pub fn keyword(jurisdiction: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            search_term: Some(term.into()),
            limit: KEYWORD_LIMIT,
        }
    }
}

impl std::fmt::Display for JurisdictionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.search_term {
            Some(ref term) => write!(f, "'{}' in {} (limit {})", term, self.jurisdiction, self.limit),
            None => write!(f, "{} (limit {})", self.jurisdiction, self.limit),
        }
    }
}

// --- Alerts ---

/// Alert severity. Parsed leniently from model output: matching ignores case
/// and anything unrecognised becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown,
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Severity::from(value.as_str())
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
            Severity::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Structured compliance summary of one bill. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAlert {
    pub title: String,
    pub summary: String,
    pub deadline: String,
    pub action_required: String,
    pub severity: Severity,
}

impl ComplianceAlert {
    /// Deterministic alert used whenever generation fails.
    pub fn fallback(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: "Unable to generate summary".to_string(),
            deadline: "Unknown".to_string(),
            action_required: "Review manually".to_string(),
            severity: Severity::Unknown,
        }
    }
}

// --- Outcomes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Processed,
    NoSources,
    NoContent,
    Error,
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillStatus::Processed => write!(f, "processed"),
            BillStatus::NoSources => write!(f, "no_sources"),
            BillStatus::NoContent => write!(f, "no_content"),
            BillStatus::Error => write!(f, "error"),
        }
    }
}

/// Terminal classification of one bill after a processing pass.
///
/// Built only through the status constructors, which decide the optional fields:
/// `processed` carries alert and url, `error` carries the message, the others neither.
/// `fallback_alert` marks a processed bill whose alert came from the generation fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillOutcome {
    pub bill_id: String,
    pub title: String,
    pub status: BillStatus,
    pub alert: Option<ComplianceAlert>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback_alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BillOutcome {
    pub fn processed(bill: &Bill, alert: ComplianceAlert, url: impl Into<String>) -> Self {
        Self {
            alert: Some(alert),
            url: Some(url.into()),
            ..Self::bare(bill, BillStatus::Processed)
        }
    }

    /// Processed, but the alert is the deterministic fallback.
    pub fn processed_fallback(bill: &Bill, alert: ComplianceAlert, url: impl Into<String>) -> Self {
        Self {
            fallback_alert: true,
            ..Self::processed(bill, alert, url)
        }
    }

    pub fn no_sources(bill: &Bill) -> Self {
        Self::bare(bill, BillStatus::NoSources)
    }

    pub fn no_content(bill: &Bill) -> Self {
        Self::bare(bill, BillStatus::NoContent)
    }

    pub fn error(bill: &Bill, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown error".to_string()
        } else {
            message
        };
        Self {
            error: Some(message),
            ..Self::bare(bill, BillStatus::Error)
        }
    }

    fn bare(bill: &Bill, status: BillStatus) -> Self {
        Self {
            bill_id: bill.id.clone(),
            title: bill.title.clone(),
            status,
            alert: None,
            fallback_alert: false,
            url: None,
            error: None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.alert.as_ref().map(|a| a.severity)
    }
}
