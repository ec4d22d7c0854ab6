use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

const TOTAL_KEY: &str = "visits";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
    pub total: u64,
    pub today: u64,
}

/// Total and per-day visit counters kept in the durable store
pub struct VisitCounter {
    storage: Arc<dyn KeyValueStore>,
}

impl VisitCounter {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    fn daily_key(day: NaiveDate) -> String {
        format!("visits-{}", day.format("%Y-%m-%d"))
    }

    /// Unreadable or non-numeric counters count as zero
    fn read(&self, key: &str) -> u64 {
        match self.storage.get(key) {
            Ok(Some(value)) => value.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read counter {}: {}", key, e);
                0
            }
        }
    }

    pub fn record(&self, day: NaiveDate) -> Result<VisitSummary, StorageError> {
        let total = self.read(TOTAL_KEY).saturating_add(1);
        self.storage.set(TOTAL_KEY, &total.to_string())?;

        let daily_key = Self::daily_key(day);
        let today = self.read(&daily_key).saturating_add(1);
        self.storage.set(&daily_key, &today.to_string())?;

        Ok(VisitSummary { total, today })
    }

    pub fn summary(&self, day: NaiveDate) -> VisitSummary {
        VisitSummary {
            total: self.read(TOTAL_KEY),
            today: self.read(&Self::daily_key(day)),
        }
    }
}
