use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::Reconciler;

/// Last full-recompute start per logical day. The guard stops re-entrant
/// recompute storms; an in-progress run is never cancelled mid-flight.
static LAST_SYNC: Lazy<Mutex<HashMap<NaiveDate, Instant>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn throttle_passed(day: LogicalDay, min_gap: Duration) -> bool {
    let mut guard = LAST_SYNC.lock().expect("sync throttle poisoned");
    match guard.get(&day.date()) {
        Some(last) if last.elapsed() < min_gap => false,
        _ => {
            guard.insert(day.date(), Instant::now());
            true
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncReport {
    /// Another run for this day finished too recently.
    Throttled,
    Ran { employees: usize, failures: usize },
}

/// Throttled full-employee recompute for one logical day; entry point
/// shared by the background loop and the explicit trigger endpoint.
pub async fn run(
    recon: &Reconciler,
    day: LogicalDay,
    min_gap: Duration,
) -> anyhow::Result<SyncReport> {
    if !throttle_passed(day, min_gap) {
        tracing::debug!(day = %day, "Sync skipped, throttled");
        return Ok(SyncReport::Throttled);
    }
    let outcome = recon.reconcile_day(day, None).await?;
    Ok(SyncReport::Ran { employees: outcome.total, failures: outcome.failures })
}
