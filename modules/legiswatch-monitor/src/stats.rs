use legiswatch_common::{BillOutcome, BillStatus};

/// Per-status counts of a processing pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub processed: usize,
    pub no_sources: usize,
    pub no_content: usize,
    pub errors: usize,
    /// Processed bills whose alert is the generation fallback.
    pub fallback_alerts: usize,
}

impl RunStats {
    pub fn from_outcomes(outcomes: &[BillOutcome]) -> Self {
        let mut stats = RunStats {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.status {
                BillStatus::Processed => stats.processed += 1,
                BillStatus::NoSources => stats.no_sources += 1,
                BillStatus::NoContent => stats.no_content += 1,
                BillStatus::Error => stats.errors += 1,
            }
            if outcome.fallback_alert {
                stats.fallback_alerts += 1;
            }
        }
        stats
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Processing Summary ===")?;
        writeln!(f, "Total bills:            {}", self.total)?;
        writeln!(f, "Successfully processed: {}", self.processed)?;
        writeln!(f, "  Fallback alerts:      {}", self.fallback_alerts)?;
        writeln!(f, "No sources:             {}", self.no_sources)?;
        writeln!(f, "No content:             {}", self.no_content)?;
        write!(f, "Errors:                 {}", self.errors)
    }
}
