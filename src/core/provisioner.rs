use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use crate::core::logical_day::Period;

/// Guarantees a month's full grid of ledger rows (one per employee per
/// day) exists before anything reads or reconciles it. Concurrent
/// first-callers for the same month share one in-flight provisioning
/// run; the unique (employee_id, day) key makes re-runs and cross-
/// process races idempotent.
pub struct MonthProvisioner {
    pool: SqlitePool,
    inflight: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
}

impl MonthProvisioner {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, inflight: Mutex::new(HashMap::new()) }
    }

    pub async fn ensure(&self, period: Period) -> anyhow::Result<()> {
        let cell = {
            let mut guard = self.inflight.lock().expect("provisioner map poisoned");
            guard.entry(period.key()).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };
        cell.get_or_try_init(|| self.provision(period)).await?;
        Ok(())
    }

    async fn provision(&self, period: Period) -> anyhow::Result<()> {
        let employees: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM employees ORDER BY id").fetch_all(&self.pool).await?;
        let key = period.key();

        for day in period.days() {
            for (employee_id,) in &employees {
                sqlx::query(
                    "INSERT OR IGNORE INTO ledger (period, employee_id, day) VALUES (?, ?, ?)",
                )
                .bind(&key)
                .bind(employee_id)
                .bind(day)
                .execute(&self.pool)
                .await?;
            }
        }

        tracing::info!(period = %key, employees = employees.len(), "Month ledger provisioned");
        Ok(())
    }

    /// Back-fill for an employee created after their first month was
    /// already provisioned.
    pub async fn backfill_employee(&self, period: Period, employee_id: i64) -> anyhow::Result<()> {
        let key = period.key();
        for day in period.days() {
            sqlx::query("INSERT OR IGNORE INTO ledger (period, employee_id, day) VALUES (?, ?, ?)")
                .bind(&key)
                .bind(employee_id)
                .bind(day)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}
