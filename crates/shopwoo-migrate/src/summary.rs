//! Per-run outcome counts.

use std::fmt;

use crate::error::UpsertError;
use crate::upsert::UpsertOutcome;

/// Counts of what happened to each product in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Variations rejected under products that were otherwise saved.
    pub variations_failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &Result<UpsertOutcome, UpsertError>) {
        self.total += 1;
        match result {
            Ok(UpsertOutcome::Created { variations, .. }) => {
                self.created += 1;
                self.variations_failed += variations.failed;
            }
            Ok(UpsertOutcome::Updated { variations, .. }) => {
                self.updated += 1;
                self.variations_failed += variations.failed;
            }
            Ok(UpsertOutcome::Skipped { .. }) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Counts a product that never reached the upsert (e.g. an undecodable
    /// record or a failed fetch).
    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    /// Products handled without error, skips included.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}/{} products ({} created, {} updated, {} skipped, {} failed)",
            self.succeeded(),
            self.total,
            self.created,
            self.updated,
            self.skipped,
            self.failed
        )
    }
}
