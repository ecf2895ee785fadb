use anyhow::{anyhow, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::NaiveDateTime;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::sync::RwLock;

/// Expected punch volume between restarts and tolerated false-positive
/// rate. A false positive only costs one missed notification.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static PUNCH_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Stable dedup key for one punch event.
pub fn dedup_key(employee_id: i64, punched_at: NaiveDateTime) -> String {
    format!("{}@{}", employee_id, punched_at.format("%Y-%m-%d %H:%M:%S"))
}

/// Check whether a punch was already notified (false positives possible)
pub fn already_seen(key: &str) -> bool {
    PUNCH_FILTER
        .read()
        .expect("punch filter poisoned")
        .contains(&key.to_string())
}

/// Record a punch as notified
pub fn mark_seen(key: &str) {
    PUNCH_FILTER
        .write()
        .expect("punch filter poisoned")
        .add(&key.to_string());
}

/// Warm up the filter from persisted notification keys, streamed in batches
pub async fn warmup_punch_filter(pool: &SqlitePool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        "SELECT dedup_key FROM notifications WHERE dedup_key IS NOT NULL",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (key,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Punch filter warmup complete: {} keys", total);
    Ok(())
}

fn insert_batch(keys: &[String]) {
    let mut filter = PUNCH_FILTER.write().expect("punch filter poisoned");

    for key in keys {
        filter.add(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn marking_makes_a_key_visible() {
        let ts = NaiveDate::from_ymd_opt(2031, 7, 9)
            .unwrap()
            .and_hms_opt(7, 25, 0)
            .unwrap();
        let key = dedup_key(424242, ts);
        assert!(!already_seen(&key));
        mark_seen(&key);
        assert!(already_seen(&key));
    }
}
