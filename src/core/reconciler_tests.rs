// End-to-end reconciliation tests over an in-memory database.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use crate::core::cache::LedgerCache;
    use crate::core::clock::FixedClock;
    use crate::core::logical_day::{LogicalDay, Period};
    use crate::core::notifier::Notifier;
    use crate::core::provisioner::MonthProvisioner;
    use crate::core::reconciler::Reconciler;
    use crate::core::rules::Rules;
    use crate::model::ledger::LedgerRow;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn test_pool() -> SqlitePool {
        // A single connection keeps every caller on the same in-memory DB.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        pool
    }

    fn reconciler(pool: &SqlitePool, now: &str) -> Reconciler {
        Reconciler::new(
            pool.clone(),
            Arc::new(MonthProvisioner::new(pool.clone())),
            Arc::new(LedgerCache::new(Duration::from_secs(30), Duration::from_secs(300))),
            Arc::new(Notifier::new(pool.clone())),
            Arc::new(FixedClock(ts(now))),
            Rules::default(),
        )
    }

    async fn seed_employee(pool: &SqlitePool, name: &str, department: &str) -> i64 {
        sqlx::query("INSERT INTO employees (name, department, salary) VALUES (?, ?, 4000)")
            .bind(name)
            .bind(department)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn schedule_all(pool: &SqlitePool, employee_id: i64, label: &str) {
        sqlx::query(
            "INSERT INTO schedules \
             (employee_id, sunday, monday, tuesday, wednesday, thursday, friday, saturday) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(employee_id) DO NOTHING",
        )
        .bind(employee_id)
        .bind(label)
        .bind(label)
        .bind(label)
        .bind(label)
        .bind(label)
        .bind(label)
        .bind(label)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn add_punch(pool: &SqlitePool, employee_id: i64, at: &str) {
        let when = ts(at);
        sqlx::query("INSERT INTO punches (employee_id, punched_at, punch_day) VALUES (?, ?, ?)")
            .bind(employee_id)
            .bind(when)
            .bind(when.date())
            .execute(pool)
            .await
            .unwrap();
    }

    async fn ledger_row(pool: &SqlitePool, employee_id: i64, day: &str) -> LedgerRow {
        sqlx::query_as("SELECT * FROM ledger WHERE employee_id = ? AND day = ?")
            .bind(employee_id)
            .bind(d(day))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn lateness_produces_retard_fact_and_auto_infraction() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Rachid", "Cuisine").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:25:00").await;
        add_punch(&pool, emp, "2025-03-04 16:00:00").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.present, 1);
        assert_eq!(row.retard_minutes, 25);
        assert_eq!(row.infraction, 30.0);
        assert_eq!(row.clock_in.as_deref(), Some("07:25"));
        assert_eq!(row.clock_out.as_deref(), Some("16:00"));
        assert!(!row.manually_edited);

        let minutes: i64 =
            sqlx::query_scalar("SELECT minutes FROM retards WHERE employee_id = ? AND day = ?")
                .bind(emp)
                .bind(d("2025-03-04"))
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(minutes, 25);
    }

    #[tokio::test]
    async fn repos_day_without_punches_stays_clean() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Sara", "Salle").await;
        schedule_all(&pool, emp, "Repos").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.present, 0);
        assert_eq!(row.retard_minutes, 0);
        assert_eq!(row.remark, None);

        let absents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM absents WHERE employee_id = ?")
            .bind(emp)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(absents, 0);
    }

    #[tokio::test]
    async fn frozen_row_survives_recompute_unchanged() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Omar", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:25:00").await;
        add_punch(&pool, emp, "2025-03-04 16:00:00").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        let day = LogicalDay::new(d("2025-03-04"));
        recon.reconcile_day(day, None).await.unwrap();

        sqlx::query(
            "UPDATE ledger SET manually_edited = 1, present = 0, retard_minutes = 7, \
             remark = 'vu avec la direction' WHERE employee_id = ? AND day = ?",
        )
        .bind(emp)
        .bind(d("2025-03-04"))
        .execute(&pool)
        .await
        .unwrap();

        // New evidence arrives; the frozen row must not move.
        add_punch(&pool, emp, "2025-03-04 08:00:00").await;
        recon.reconcile_day(day, None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.present, 0);
        assert_eq!(row.retard_minutes, 7);
        assert_eq!(row.remark.as_deref(), Some("vu avec la direction"));
        assert_eq!(row.clock_in.as_deref(), Some("07:25"));
    }

    #[tokio::test]
    async fn pardon_is_idempotent_and_freezes_the_row() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Nadia", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        let day = LogicalDay::new(d("2025-03-04"));
        recon.reconcile_day(day, None).await.unwrap();
        assert_eq!(ledger_row(&pool, emp, "2025-03-04").await.present, 0);

        recon.pardon(emp, day).await.unwrap();
        let first = ledger_row(&pool, emp, "2025-03-04").await;
        recon.pardon(emp, day).await.unwrap();
        let second = ledger_row(&pool, emp, "2025-03-04").await;

        assert_eq!(first.present, 1);
        assert_eq!(first.retard_minutes, 0);
        assert_eq!(first.infraction, 0.0);
        assert_eq!(first.clock_in.as_deref(), Some("07:00"));
        assert_eq!(first.clock_out.as_deref(), Some("15:00"));
        assert_eq!(first.remark.as_deref(), Some("Pardonné"));
        assert!(first.manually_edited);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));

        let absents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM absents WHERE employee_id = ?")
            .bind(emp)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(absents, 0);

        // Recompute after the pardon must not reopen the absence.
        recon.reconcile_day(day, None).await.unwrap();
        let after = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(after.present, 1);
        assert_eq!(after.remark.as_deref(), Some("Pardonné"));
    }

    #[tokio::test]
    async fn concurrent_provisioning_inserts_exactly_one_grid() {
        let pool = test_pool().await;
        seed_employee(&pool, "A", "Salle").await;
        seed_employee(&pool, "B", "Salle").await;

        let provisioner = MonthProvisioner::new(pool.clone());
        let period = Period::parse("2025_03").unwrap();
        let (r1, r2) = tokio::join!(provisioner.ensure(period), provisioner.ensure(period));
        r1.unwrap();
        r2.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger WHERE period = '2025_03'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 2 * 31);

        // A fresh provisioner (fresh process) is also a no-op.
        MonthProvisioner::new(pool.clone()).ensure(period).await.unwrap();
        let again: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger WHERE period = '2025_03'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(again, rows);
    }

    #[tokio::test]
    async fn retard_edit_rewrites_clock_in_and_first_punch() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Karim", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:25:00").await;
        add_punch(&pool, emp, "2025-03-04 16:00:00").await;
        add_punch(&pool, emp, "2025-03-03 07:10:00").await;
        add_punch(&pool, emp, "2025-03-03 15:30:00").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        let day = LogicalDay::new(d("2025-03-04"));
        recon.reconcile_day(day, None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        recon
            .apply_manual_edit(&row, &serde_json::json!({"retard_minutes": 45}))
            .await
            .unwrap();

        let edited = ledger_row(&pool, emp, "2025-03-04").await;
        assert!(edited.manually_edited);
        assert_eq!(edited.retard_minutes, 45);
        assert_eq!(edited.clock_in.as_deref(), Some("07:45"));

        let times: Vec<(NaiveDateTime,)> = sqlx::query_as(
            "SELECT punched_at FROM punches WHERE employee_id = ? ORDER BY punched_at",
        )
        .bind(emp)
        .fetch_all(&pool)
        .await
        .unwrap();
        let rendered: Vec<String> =
            times.iter().map(|(t,)| t.format("%Y-%m-%d %H:%M").to_string()).collect();
        // Only the edited day's first punch moved.
        assert_eq!(
            rendered,
            vec![
                "2025-03-03 07:10".to_string(),
                "2025-03-03 15:30".to_string(),
                "2025-03-04 07:45".to_string(),
                "2025-03-04 16:00".to_string(),
            ]
        );

        let minutes: i64 =
            sqlx::query_scalar("SELECT minutes FROM retards WHERE employee_id = ? AND day = ?")
                .bind(emp)
                .bind(d("2025-03-04"))
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(minutes, 45);
    }

    #[tokio::test]
    async fn manual_infraction_record_suppresses_the_automatic_penalty() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Yassine", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:25:00").await;
        add_punch(&pool, emp, "2025-03-04 16:00:00").await;
        sqlx::query("INSERT INTO extras (employee_id, day, amount, motive) VALUES (?, ?, 20, 'infraction retard répété')")
            .bind(emp)
            .bind(d("2025-03-04"))
            .execute(&pool)
            .await
            .unwrap();

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.retard_minutes, 25);
        assert_eq!(row.infraction, 20.0);
    }

    #[tokio::test]
    async fn side_table_aggregation_filters_and_parses() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Hafsa", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:00:00").await;
        add_punch(&pool, emp, "2025-03-04 15:00:00").await;

        sqlx::query("INSERT INTO advances (employee_id, day, amount, status) VALUES (?, ?, 100, 'Validé')")
            .bind(emp).bind(d("2025-03-04")).execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO advances (employee_id, day, amount, status) VALUES (?, ?, 50, 'Refusé')")
            .bind(emp).bind(d("2025-03-04")).execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO extras (employee_id, day, amount, motive) VALUES (?, ?, 0, 'mise à pied 3 jours')")
            .bind(emp).bind(d("2025-03-04")).execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO doublages (employee_id, day, amount, motive) VALUES (?, ?, 80, 'Doublage')")
            .bind(emp).bind(d("2025-03-04")).execute(&pool).await.unwrap();

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.advance, 100.0);
        assert_eq!(row.doublage, 80.0);
        assert_eq!(row.mise_a_pied_days, 3);
        assert_eq!(row.infraction, 0.0);
    }

    #[tokio::test]
    async fn missing_exit_on_closed_day_marks_absent() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Adil", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;
        add_punch(&pool, emp, "2025-03-04 07:40:00").await;

        let recon = reconciler(&pool, "2025-03-06 09:00:00");
        recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();

        let row = ledger_row(&pool, emp, "2025-03-04").await;
        assert_eq!(row.present, 0);
        assert_eq!(row.retard_minutes, 0);
        assert_eq!(row.remark.as_deref(), Some("Pointage de sortie manquant"));

        let reason: String =
            sqlx::query_scalar("SELECT reason FROM absents WHERE employee_id = ? AND day = ?")
                .bind(emp)
                .bind(d("2025-03-04"))
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reason, "Pointage de sortie manquant");
    }

    #[tokio::test]
    async fn batch_covers_every_unblocked_employee() {
        let pool = test_pool().await;
        let a = seed_employee(&pool, "A", "Salle").await;
        let b = seed_employee(&pool, "B", "Salle").await;
        schedule_all(&pool, a, "Matin").await;
        schedule_all(&pool, b, "Matin").await;
        add_punch(&pool, b, "2025-03-04 07:05:00").await;
        add_punch(&pool, b, "2025-03-04 15:00:00").await;
        sqlx::query("UPDATE employees SET blocked = 1 WHERE id = ?")
            .bind(a)
            .execute(&pool)
            .await
            .unwrap();

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        let outcome = recon.reconcile_day(LogicalDay::new(d("2025-03-04")), None).await.unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.failures, 0);
        assert_eq!(ledger_row(&pool, b, "2025-03-04").await.present, 1);
    }

    #[tokio::test]
    async fn set_paid_flips_the_whole_month_slice() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, "Mounir", "Salle").await;
        schedule_all(&pool, emp, "Matin").await;

        let recon = reconciler(&pool, "2025-03-05 12:00:00");
        let period = Period::parse("2025_03").unwrap();
        let affected = recon.set_paid(period, emp, true).await.unwrap();
        assert_eq!(affected, 31);

        let unpaid: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ledger WHERE period = '2025_03' AND employee_id = ? AND paid = 0",
        )
        .bind(emp)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(unpaid, 0);
    }
}
