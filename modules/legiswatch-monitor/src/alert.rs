use std::sync::Arc;

use tracing::{info, warn};

use ai_client::{strip_code_blocks, truncate_chars, Message, ResponseMode};
use legiswatch_common::ComplianceAlert;

use crate::traits::ChatModel;

/// Bill text beyond this many characters is cut before prompting.
pub const MAX_CONTENT_CHARS: usize = 8000;

/// Outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertGeneration {
    Generated(ComplianceAlert),
    /// The model call or its JSON failed; `alert` is the deterministic fallback.
    Fallback { alert: ComplianceAlert, reason: String },
}

impl AlertGeneration {
    pub fn alert(&self) -> &ComplianceAlert {
        match self {
            AlertGeneration::Generated(alert) => alert,
            AlertGeneration::Fallback { alert, .. } => alert,
        }
    }

    pub fn into_alert(self) -> ComplianceAlert {
        match self {
            AlertGeneration::Generated(alert) => alert,
            AlertGeneration::Fallback { alert, .. } => alert,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AlertGeneration::Fallback { .. })
    }
}

/// Turns bill text into a `ComplianceAlert` through the language model.
/// Total: every input yields an alert, falling back when the model misbehaves.
pub struct AlertGenerator {
    model: Arc<dyn ChatModel>,
}

impl AlertGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, title: &str, content: &str) -> AlertGeneration {
        let prompt = build_prompt(title, content);

        let raw = match self
            .model
            .complete(&[Message::user(prompt)], ResponseMode::JsonObject)
            .await
        {
            Ok(raw) => raw,
            Err(e) => return fallback(title, format!("model call failed: {e:#}")),
        };

        match parse_alert(&raw) {
            Ok(alert) => {
                info!(title, severity = %alert.severity, model = self.model.name(), "Generated compliance alert");
                AlertGeneration::Generated(alert)
            }
            Err(e) => fallback(title, format!("invalid alert JSON: {e}")),
        }
    }
}

fn fallback(title: &str, reason: String) -> AlertGeneration {
    warn!(title, reason = %reason, "Alert generation failed, using fallback");
    AlertGeneration::Fallback {
        alert: ComplianceAlert::fallback(title),
        reason,
    }
}

/// Build the single user prompt. `content` is silently truncated to
/// `MAX_CONTENT_CHARS` characters.
pub fn build_prompt(title: &str, content: &str) -> String {
    let content = truncate_chars(content, MAX_CONTENT_CHARS);
    format!(
        "Summarize the following legislative change for a crypto compliance officer.\n\
         Respond with a JSON object containing exactly these keys: \
         title, summary, deadline, action_required, severity.\n\
         severity must be one of High, Medium, Low.\n\
         BILL: {title}\n\
         TEXT:\n{content}"
    )
}

/// Parse a model reply into an alert. All five keys must be present as strings.
pub fn parse_alert(raw: &str) -> Result<ComplianceAlert, serde_json::Error> {
    serde_json::from_str(strip_code_blocks(raw))
}
