use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Datelike, Duration, NaiveDateTime};
use futures::future::join_all;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::core::aggregator;
use crate::core::cache::LedgerCache;
use crate::core::classifier::{self, DayContext, Verdict};
use crate::core::clock::Clock;
use crate::core::logical_day::{LogicalDay, Period};
use crate::core::notifier::{Notifier, NotifyRequest};
use crate::core::provisioner::MonthProvisioner;
use crate::core::rules::Rules;
use crate::model::employee::Employee;
use crate::model::ledger::LedgerRow;
use crate::model::schedule::ScheduleRow;
use crate::model::shift::{AdvanceStatus, Shift};
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::punch_filter;

/// Ledger columns an operator may set through the manual-edit endpoint.
/// `manually_edited` itself is deliberately absent: it is set by the
/// edit protocol, never by payload.
pub const LEDGER_EDITABLE: &[&str] = &[
    "present",
    "advance",
    "extra",
    "prime",
    "infraction",
    "doublage",
    "mise_a_pied_days",
    "retard_minutes",
    "remark",
    "clock_in",
    "clock_out",
    "paid",
];

const ADJUSTMENT_MOTIVE: &str = "Ajustement manuel";

/// Single atomic conditional write: every derived column lands only if
/// the row is not frozen by a human edit. Expressing the guard inside
/// the upsert (rather than read-then-write) closes the race where an
/// edit lands between the read and the write.
const LEDGER_UPSERT: &str = "\
INSERT INTO ledger (period, employee_id, day, present, advance, extra, prime, infraction, \
 doublage, mise_a_pied_days, retard_minutes, remark, clock_in, clock_out, manually_edited, paid) \
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0) \
ON CONFLICT(employee_id, day) DO UPDATE SET \
 present = CASE WHEN ledger.manually_edited THEN ledger.present ELSE excluded.present END, \
 advance = CASE WHEN ledger.manually_edited THEN ledger.advance ELSE excluded.advance END, \
 extra = CASE WHEN ledger.manually_edited THEN ledger.extra ELSE excluded.extra END, \
 prime = CASE WHEN ledger.manually_edited THEN ledger.prime ELSE excluded.prime END, \
 infraction = CASE WHEN ledger.manually_edited THEN ledger.infraction ELSE excluded.infraction END, \
 doublage = CASE WHEN ledger.manually_edited THEN ledger.doublage ELSE excluded.doublage END, \
 mise_a_pied_days = CASE WHEN ledger.manually_edited THEN ledger.mise_a_pied_days ELSE excluded.mise_a_pied_days END, \
 retard_minutes = CASE WHEN ledger.manually_edited THEN ledger.retard_minutes ELSE excluded.retard_minutes END, \
 remark = CASE WHEN ledger.manually_edited THEN ledger.remark ELSE excluded.remark END, \
 clock_in = CASE WHEN ledger.manually_edited THEN ledger.clock_in ELSE excluded.clock_in END, \
 clock_out = CASE WHEN ledger.manually_edited THEN ledger.clock_out ELSE excluded.clock_out END";

/// Extras routed into ledger buckets by motive prefix.
#[derive(Debug, Default, PartialEq)]
pub struct ExtraBuckets {
    pub extra: f64,
    pub prime: f64,
    /// Some(total) once at least one manual infraction record exists;
    /// its presence suppresses the automatic penalty.
    pub manual_infraction: Option<f64>,
    pub mise_a_pied_days: i64,
}

/// Fold extras rows (ordered oldest first) into their ledger buckets.
/// The oldest "mise à pied" record wins; its day count comes from the
/// free text, a parse the source data forces on us.
pub fn bucket_extras(rows: &[(f64, String)]) -> ExtraBuckets {
    let mut buckets = ExtraBuckets::default();
    let mut mise_seen = false;
    for (amount, motive) in rows {
        let m = motive.trim().to_lowercase();
        if m.starts_with("prime") {
            buckets.prime += amount;
        } else if m.starts_with("infraction") {
            *buckets.manual_infraction.get_or_insert(0.0) += amount;
        } else if m.starts_with("mise à pied") || m.starts_with("mise a pied") {
            if !mise_seen {
                mise_seen = true;
                buckets.mise_a_pied_days = parse_mise_a_pied_days(&m);
            }
        } else {
            buckets.extra += amount;
        }
    }
    buckets
}

pub fn parse_mise_a_pied_days(motive: &str) -> i64 {
    motive.split_whitespace().find_map(|tok| tok.parse::<i64>().ok()).unwrap_or(1)
}

struct SideAggregate {
    advance: f64,
    doublage: f64,
    buckets: ExtraBuckets,
    retard: Option<(i64, String)>,
    absent_reason: Option<String>,
}

#[derive(Debug)]
pub struct DayOutcome {
    pub total: usize,
    pub failures: usize,
}

/// Re-derives ledger rows from punches and side tables, while never
/// clobbering rows a human has frozen.
pub struct Reconciler {
    pool: SqlitePool,
    provisioner: Arc<MonthProvisioner>,
    cache: Arc<LedgerCache>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    rules: Rules,
}

impl Reconciler {
    pub fn new(
        pool: SqlitePool,
        provisioner: Arc<MonthProvisioner>,
        cache: Arc<LedgerCache>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
        rules: Rules,
    ) -> Self {
        Self { pool, provisioner, cache, notifier, clock, rules }
    }

    pub fn cache(&self) -> &LedgerCache {
        &self.cache
    }

    pub fn provisioner(&self) -> &MonthProvisioner {
        &self.provisioner
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Recompute every eligible employee's row for one logical day.
    /// One employee's failure never aborts the others.
    pub async fn reconcile_day(&self, day: LogicalDay, only: Option<i64>) -> anyhow::Result<DayOutcome> {
        self.provisioner.ensure(day.period()).await?;

        let employees: Vec<Employee> = match only {
            Some(id) => {
                sqlx::query_as("SELECT * FROM employees WHERE id = ? AND blocked = 0")
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM employees WHERE blocked = 0 ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let results = join_all(employees.iter().map(|emp| self.reconcile_employee(emp, day))).await;

        let mut failures = 0usize;
        for (emp, result) in employees.iter().zip(results) {
            if let Err(e) = result {
                failures += 1;
                tracing::error!(error = %e, employee_id = emp.id, day = %day, "Employee reconciliation failed");
            }
        }

        self.cache.invalidate_all();
        Ok(DayOutcome { total: employees.len(), failures })
    }

    async fn reconcile_employee(&self, emp: &Employee, day: LogicalDay) -> anyhow::Result<()> {
        let punches =
            aggregator::punches_for_day(&self.pool, day, Some(emp.id), self.rules.punch_dedup_minutes)
                .await?;
        let times: Vec<NaiveDateTime> = punches.iter().map(|p| p.punched_at).collect();
        let scheduled = self.scheduled_shift(emp.id, day).await?;
        let now = self.clock.now();

        let verdict = classifier::classify(
            &self.rules,
            &DayContext { day, scheduled, department: &emp.department, punches: &times, now },
        );

        let frozen = self.is_manually_edited(emp.id, day).await?;
        if !frozen {
            self.sync_side_records(emp.id, day, &verdict).await?;
        }

        let agg = self.aggregate_side_tables(emp.id, day).await?;
        let retard_minutes = agg.retard.as_ref().map(|(m, _)| *m).unwrap_or(0);
        let infraction = match agg.buckets.manual_infraction {
            Some(total) => total,
            None if retard_minutes > self.rules.retard_threshold_minutes => {
                self.rules.infraction_penalty
            }
            None => 0.0,
        };
        let present: i64 =
            if agg.absent_reason.is_some() { 0 } else if verdict.present() { 1 } else { 0 };
        let remark =
            agg.absent_reason.clone().or_else(|| agg.retard.as_ref().map(|(_, r)| r.clone()));
        let clock_in = verdict.clock_in.map(|t| t.format("%H:%M").to_string());
        let clock_out = verdict.clock_out.map(|t| t.format("%H:%M").to_string());

        sqlx::query(LEDGER_UPSERT)
            .bind(day.period().key())
            .bind(emp.id)
            .bind(day.date())
            .bind(present)
            .bind(agg.advance)
            .bind(agg.buckets.extra)
            .bind(agg.buckets.prime)
            .bind(infraction)
            .bind(agg.doublage)
            .bind(agg.buckets.mise_a_pied_days)
            .bind(retard_minutes)
            .bind(&remark)
            .bind(&clock_in)
            .bind(&clock_out)
            .execute(&self.pool)
            .await?;

        // Newly-seen punches on the open day raise a notification, once.
        if day == LogicalDay::containing(now) {
            for punch in &punches {
                let key = punch_filter::dedup_key(emp.id, punch.punched_at);
                if punch_filter::already_seen(&key) {
                    continue;
                }
                punch_filter::mark_seen(&key);
                self.notifier
                    .notify(
                        NotifyRequest {
                            kind: "pointage",
                            title: "Nouveau pointage",
                            message: format!(
                                "{} a pointé à {}",
                                emp.name,
                                punch.punched_at.format("%H:%M")
                            ),
                            employee_id: Some(emp.id),
                            actor: None,
                            deep_link: Some(format!("/ledger/{}", day.period().key())),
                            dedup_key: Some(key),
                        },
                        now,
                    )
                    .await;
            }
        }

        Ok(())
    }

    async fn scheduled_shift(&self, employee_id: i64, day: LogicalDay) -> anyhow::Result<Shift> {
        let row: Option<ScheduleRow> =
            sqlx::query_as("SELECT * FROM schedules WHERE employee_id = ?")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
        let row = row.unwrap_or_else(|| ScheduleRow::all_repos(employee_id));
        Ok(row.shift_for(day.date().weekday()))
    }

    async fn is_manually_edited(&self, employee_id: i64, day: LogicalDay) -> anyhow::Result<bool> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT manually_edited FROM ledger WHERE employee_id = ? AND day = ?")
                .bind(employee_id)
                .bind(day.date())
                .fetch_optional(&self.pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }

    /// Project the classifier verdict into the retard/absent fact
    /// tables. Only called for unfrozen days: frozen rows own their
    /// facts via the manual-edit back-propagation instead.
    async fn sync_side_records(
        &self,
        employee_id: i64,
        day: LogicalDay,
        verdict: &Verdict,
    ) -> anyhow::Result<()> {
        if verdict.absent {
            sqlx::query(
                "INSERT INTO absents (employee_id, day, reason) VALUES (?, ?, ?) \
                 ON CONFLICT(employee_id, day) DO UPDATE SET reason = excluded.reason",
            )
            .bind(employee_id)
            .bind(day.date())
            .bind(verdict.reason.as_deref().unwrap_or(classifier::REASON_ABSENCE))
            .execute(&self.pool)
            .await?;
            self.delete_fact(employee_id, day, "retards").await?;
        } else if verdict.retard_minutes > 0 {
            sqlx::query(
                "INSERT INTO retards (employee_id, day, minutes, reason) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(employee_id, day) DO UPDATE SET \
                 minutes = excluded.minutes, reason = excluded.reason",
            )
            .bind(employee_id)
            .bind(day.date())
            .bind(verdict.retard_minutes)
            .bind(verdict.reason.as_deref().unwrap_or(classifier::REASON_RETARD))
            .execute(&self.pool)
            .await?;
            self.delete_fact(employee_id, day, "absents").await?;
        } else {
            self.delete_fact(employee_id, day, "retards").await?;
            self.delete_fact(employee_id, day, "absents").await?;
        }
        Ok(())
    }

    async fn delete_fact(&self, employee_id: i64, day: LogicalDay, table: &str) -> anyhow::Result<()> {
        let sql = format!("DELETE FROM {} WHERE employee_id = ? AND day = ?", table);
        sqlx::query(&sql).bind(employee_id).bind(day.date()).execute(&self.pool).await?;
        Ok(())
    }

    async fn aggregate_side_tables(
        &self,
        employee_id: i64,
        day: LogicalDay,
    ) -> anyhow::Result<SideAggregate> {
        let advance: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM advances \
             WHERE employee_id = ? AND day = ? AND status IN (?, ?, ?)",
        )
        .bind(employee_id)
        .bind(day.date())
        .bind(AdvanceStatus::COUNTABLE[0])
        .bind(AdvanceStatus::COUNTABLE[1])
        .bind(AdvanceStatus::COUNTABLE[2])
        .fetch_one(&self.pool)
        .await?;

        let doublage: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM doublages WHERE employee_id = ? AND day = ?",
        )
        .bind(employee_id)
        .bind(day.date())
        .fetch_one(&self.pool)
        .await?;

        let extras: Vec<(f64, String)> = sqlx::query_as(
            "SELECT amount, motive FROM extras WHERE employee_id = ? AND day = ? ORDER BY id",
        )
        .bind(employee_id)
        .bind(day.date())
        .fetch_all(&self.pool)
        .await?;

        let retard: Option<(i64, String)> = sqlx::query_as(
            "SELECT minutes, reason FROM retards WHERE employee_id = ? AND day = ?",
        )
        .bind(employee_id)
        .bind(day.date())
        .fetch_optional(&self.pool)
        .await?;

        let absent_reason: Option<String> =
            sqlx::query_scalar("SELECT reason FROM absents WHERE employee_id = ? AND day = ?")
                .bind(employee_id)
                .bind(day.date())
                .fetch_optional(&self.pool)
                .await?;

        Ok(SideAggregate { advance, doublage, buckets: bucket_extras(&extras), retard, absent_reason })
    }

    /// Administrative forgiveness: the day becomes a fully-present,
    /// frozen row with nominal clock times. Applying it twice yields
    /// the same row.
    pub async fn pardon(&self, employee_id: i64, day: LogicalDay) -> anyhow::Result<()> {
        self.provisioner.ensure(day.period()).await?;

        let scheduled = self.scheduled_shift(employee_id, day).await?;
        let shift = if scheduled == Shift::Repos { Shift::Matin } else { scheduled };
        let (start, end) = self.rules.nominal_window(shift);

        let updated = sqlx::query(
            "UPDATE ledger SET present = 1, retard_minutes = 0, infraction = 0, \
             clock_in = ?, clock_out = ?, remark = 'Pardonné', manually_edited = 1 \
             WHERE employee_id = ? AND day = ?",
        )
        .bind(start.format("%H:%M").to_string())
        .bind(end.format("%H:%M").to_string())
        .bind(employee_id)
        .bind(day.date())
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(anyhow!("no ledger row for employee {} on {}", employee_id, day));
        }

        self.delete_fact(employee_id, day, "retards").await?;
        self.delete_fact(employee_id, day, "absents").await?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Operator override of one ledger row. Freezes the row first, so
    /// the recompute that follows only heals *other* rows, then applies
    /// the explicit values and pushes them back into the side tables.
    pub async fn apply_manual_edit(&self, row: &LedgerRow, fields: &Value) -> anyhow::Result<()> {
        let day = LogicalDay::new(row.day);

        sqlx::query("UPDATE ledger SET manually_edited = 1 WHERE id = ?")
            .bind(row.id)
            .execute(&self.pool)
            .await?;

        self.reconcile_day(day, None).await?;

        let update = build_update_sql("ledger", fields, "id", row.id, LEDGER_EDITABLE)
            .map_err(|e| anyhow!("{}", e))?;
        execute_update(&self.pool, update).await?;

        self.backpropagate(row, day, fields).await?;
        self.cache.invalidate_all();
        Ok(())
    }

    async fn backpropagate(
        &self,
        row: &LedgerRow,
        day: LogicalDay,
        fields: &Value,
    ) -> anyhow::Result<()> {
        let obj = fields.as_object().ok_or_else(|| anyhow!("edit payload must be an object"))?;

        if let Some(minutes) = obj.get("retard_minutes").and_then(Value::as_i64) {
            self.propagate_retard(row, day, minutes).await?;
        }

        if let Some(present) = obj.get("present").and_then(Value::as_i64) {
            if present == 0 {
                sqlx::query(
                    "INSERT INTO absents (employee_id, day, reason) VALUES (?, ?, ?) \
                     ON CONFLICT(employee_id, day) DO UPDATE SET reason = excluded.reason",
                )
                .bind(row.employee_id)
                .bind(day.date())
                .bind("Marqué absent")
                .execute(&self.pool)
                .await?;
            } else {
                self.delete_fact(row.employee_id, day, "absents").await?;
            }
        }

        if let Some(target) = obj.get("advance").and_then(Value::as_f64) {
            self.adjust_advances(row.employee_id, day, target).await?;
        }
        if let Some(target) = obj.get("doublage").and_then(Value::as_f64) {
            self.adjust_doublages(row.employee_id, day, target).await?;
        }
        for bucket in ["extra", "prime", "infraction"] {
            if let Some(target) = obj.get(bucket).and_then(Value::as_f64) {
                self.adjust_extras(row.employee_id, day, bucket, target).await?;
            }
        }

        Ok(())
    }

    /// Retard edits also rewrite the derived clock-in and shift the
    /// day's first raw punch to match — the one sanctioned punch
    /// mutation in the system.
    async fn propagate_retard(
        &self,
        row: &LedgerRow,
        day: LogicalDay,
        minutes: i64,
    ) -> anyhow::Result<()> {
        if minutes > 0 {
            sqlx::query(
                "INSERT INTO retards (employee_id, day, minutes, reason) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(employee_id, day) DO UPDATE SET minutes = excluded.minutes",
            )
            .bind(row.employee_id)
            .bind(day.date())
            .bind(minutes)
            .bind(classifier::REASON_RETARD)
            .execute(&self.pool)
            .await?;
            self.delete_fact(row.employee_id, day, "absents").await?;
        } else {
            self.delete_fact(row.employee_id, day, "retards").await?;
        }

        let scheduled = self.scheduled_shift(row.employee_id, day).await?;
        let shift = if scheduled == Shift::Repos { Shift::Matin } else { scheduled };
        let new_in = day.at(self.rules.reference_start(shift)) + Duration::minutes(minutes);

        sqlx::query("UPDATE ledger SET clock_in = ? WHERE id = ?")
            .bind(new_in.format("%H:%M").to_string())
            .bind(row.id)
            .execute(&self.pool)
            .await?;

        let (start, end) = day.window();
        let first: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM punches WHERE employee_id = ? AND punched_at >= ? AND punched_at < ? \
             ORDER BY punched_at LIMIT 1",
        )
        .bind(row.employee_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((punch_id,)) = first {
            sqlx::query("UPDATE punches SET punched_at = ?, punch_day = ? WHERE id = ?")
                .bind(new_in)
                .bind(new_in.date())
                .bind(punch_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    async fn adjust_advances(&self, employee_id: i64, day: LogicalDay, target: f64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM advances WHERE employee_id = ? AND day = ? AND motive = ?")
            .bind(employee_id)
            .bind(day.date())
            .bind(ADJUSTMENT_MOTIVE)
            .execute(&self.pool)
            .await?;

        let current: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM advances \
             WHERE employee_id = ? AND day = ? AND status IN (?, ?, ?)",
        )
        .bind(employee_id)
        .bind(day.date())
        .bind(AdvanceStatus::COUNTABLE[0])
        .bind(AdvanceStatus::COUNTABLE[1])
        .bind(AdvanceStatus::COUNTABLE[2])
        .fetch_one(&self.pool)
        .await?;

        let delta = target - current;
        if delta.abs() > f64::EPSILON {
            sqlx::query(
                "INSERT INTO advances (employee_id, day, amount, motive, status) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(day.date())
            .bind(delta)
            .bind(ADJUSTMENT_MOTIVE)
            .bind(AdvanceStatus::Valide.to_string())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn adjust_doublages(&self, employee_id: i64, day: LogicalDay, target: f64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM doublages WHERE employee_id = ? AND day = ? AND motive = ?")
            .bind(employee_id)
            .bind(day.date())
            .bind(ADJUSTMENT_MOTIVE)
            .execute(&self.pool)
            .await?;

        let current: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM doublages WHERE employee_id = ? AND day = ?",
        )
        .bind(employee_id)
        .bind(day.date())
        .fetch_one(&self.pool)
        .await?;

        let delta = target - current;
        if delta.abs() > f64::EPSILON {
            sqlx::query("INSERT INTO doublages (employee_id, day, amount, motive) VALUES (?, ?, ?, ?)")
                .bind(employee_id)
                .bind(day.date())
                .bind(delta)
                .bind(ADJUSTMENT_MOTIVE)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn adjust_extras(
        &self,
        employee_id: i64,
        day: LogicalDay,
        bucket: &str,
        target: f64,
    ) -> anyhow::Result<()> {
        let motive = match bucket {
            "prime" => "prime - ajustement manuel",
            "infraction" => "infraction - ajustement manuel",
            _ => ADJUSTMENT_MOTIVE,
        };

        sqlx::query("DELETE FROM extras WHERE employee_id = ? AND day = ? AND motive = ?")
            .bind(employee_id)
            .bind(day.date())
            .bind(motive)
            .execute(&self.pool)
            .await?;

        let rows: Vec<(f64, String)> = sqlx::query_as(
            "SELECT amount, motive FROM extras WHERE employee_id = ? AND day = ? ORDER BY id",
        )
        .bind(employee_id)
        .bind(day.date())
        .fetch_all(&self.pool)
        .await?;
        let buckets = bucket_extras(&rows);
        let current = match bucket {
            "prime" => buckets.prime,
            "infraction" => buckets.manual_infraction.unwrap_or(0.0),
            _ => buckets.extra,
        };

        let delta = target - current;
        if delta.abs() > f64::EPSILON {
            sqlx::query("INSERT INTO extras (employee_id, day, amount, motive) VALUES (?, ?, ?, ?)")
                .bind(employee_id)
                .bind(day.date())
                .bind(delta)
                .bind(motive)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Flip the paid flag for a whole (period, employee) slice. The
    /// flag lives outside the conditional upsert's writable set, so
    /// recompute never disturbs it in either direction.
    pub async fn set_paid(&self, period: Period, employee_id: i64, paid: bool) -> anyhow::Result<u64> {
        self.provisioner.ensure(period).await?;
        let result = sqlx::query("UPDATE ledger SET paid = ? WHERE period = ? AND employee_id = ?")
            .bind(paid)
            .bind(period.key())
            .bind(employee_id)
            .execute(&self.pool)
            .await?;

        let today = LogicalDay::containing(self.clock.now());
        if period.contains(today.date()) {
            self.reconcile_day(today, Some(employee_id)).await?;
        }
        self.cache.invalidate_all();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extras_split_by_motive_prefix() {
        let rows = vec![
            (50.0, "prime de service".to_string()),
            (20.0, "Infraction tenue".to_string()),
            (15.0, "heures supplémentaires".to_string()),
            (10.0, "PRIME exceptionnelle".to_string()),
        ];
        let b = bucket_extras(&rows);
        assert_eq!(b.prime, 60.0);
        assert_eq!(b.manual_infraction, Some(20.0));
        assert_eq!(b.extra, 15.0);
        assert_eq!(b.mise_a_pied_days, 0);
    }

    #[test]
    fn oldest_mise_a_pied_wins() {
        let rows = vec![
            (0.0, "mise à pied 3 jours".to_string()),
            (0.0, "mise à pied 5 jours".to_string()),
        ];
        assert_eq!(bucket_extras(&rows).mise_a_pied_days, 3);
    }

    #[test]
    fn unparseable_mise_a_pied_defaults_to_one_day() {
        assert_eq!(parse_mise_a_pied_days("mise à pied"), 1);
        assert_eq!(parse_mise_a_pied_days("mise a pied 4 jours"), 4);
    }
}
