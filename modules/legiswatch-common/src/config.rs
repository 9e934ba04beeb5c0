use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::LegisWatchError;

pub const DEFAULT_JURISDICTIONS: &[&str] = &[
    "ocd-jurisdiction/country:us/state:ca/government",
    "ocd-jurisdiction/country:us/state:al/government",
];
pub const DEFAULT_KEYWORDS: &[&str] = &["cryptocurrency", "digital asset", "blockchain"];
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // OpenStates
    pub openstates_key: String,

    // Language model
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,

    // Search space
    pub jurisdictions: Vec<String>,
    pub keywords: Vec<String>,

    // Pacing and timeouts
    pub rate_limit_delay: Duration,
    pub request_timeout: Duration,

    // Output
    pub reports_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, LegisWatchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Every missing credential is reported in one error so a misconfigured
    /// deployment is fixed in a single pass.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LegisWatchError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };
        let openstates_key = required("OPENSTATES_KEY");
        let openai_api_key = required("OPENAI_API_KEY");
        if !missing.is_empty() {
            return Err(LegisWatchError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let openai_base_url = get("OPENAI_BASE_URL");
        // Custom endpoints name their model in MODEL, the public API in OPENAI_MODEL.
        let model = if openai_base_url.is_some() {
            get("MODEL").or_else(|| get("OPENAI_MODEL"))
        } else {
            get("OPENAI_MODEL")
        }
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let jurisdictions = get("LEGISWATCH_JURISDICTIONS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| to_owned_list(DEFAULT_JURISDICTIONS));
        let keywords = get("LEGISWATCH_KEYWORDS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| to_owned_list(DEFAULT_KEYWORDS));

        if jurisdictions.is_empty() {
            return Err(LegisWatchError::Config(
                "LEGISWATCH_JURISDICTIONS must name at least one jurisdiction".to_string(),
            ));
        }

        let rate_limit_delay = match get("LEGISWATCH_RATE_LIMIT_SECS") {
            Some(v) => parse_secs("LEGISWATCH_RATE_LIMIT_SECS", &v)?,
            None => DEFAULT_RATE_LIMIT_DELAY,
        };
        let request_timeout = match get("LEGISWATCH_REQUEST_TIMEOUT_SECS") {
            Some(v) => parse_secs("LEGISWATCH_REQUEST_TIMEOUT_SECS", &v)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        if request_timeout.is_zero() {
            return Err(LegisWatchError::Config(
                "LEGISWATCH_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let reports_dir = get("LEGISWATCH_REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./reports"));

        Ok(Self {
            openstates_key,
            openai_api_key,
            openai_base_url,
            model,
            jurisdictions,
            keywords,
            rate_limit_delay,
            request_timeout,
            reports_dir,
        })
    }

    /// Log the effective configuration with credentials reduced to a prefix.
    pub fn log_redacted(&self) {
        info!(
            openstates_key = %redact(&self.openstates_key),
            openai_api_key = %redact(&self.openai_api_key),
            openai_base_url = self.openai_base_url.as_deref().unwrap_or("default"),
            model = %self.model,
            jurisdictions = ?self.jurisdictions,
            keywords = ?self.keywords,
            rate_limit_secs = self.rate_limit_delay.as_secs_f64(),
            request_timeout_secs = self.request_timeout.as_secs_f64(),
            reports_dir = %self.reports_dir.display(),
            "Loaded configuration"
        );
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openstates_key", &redact(&self.openstates_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("jurisdictions", &self.jurisdictions)
            .field("keywords", &self.keywords)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("request_timeout", &self.request_timeout)
            .field("reports_dir", &self.reports_dir)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, LegisWatchError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            LegisWatchError::Config(format!("{key} must be a non-negative number of seconds, got {value:?}"))
        })
}
