pub mod absence;
pub mod advance;
pub mod doublage;
pub mod employee;
pub mod extra;
pub mod ledger;
pub mod notification;
pub mod punch;
pub mod retard;
pub mod schedule;
pub mod sync;

use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::core::logical_day::{LogicalDay, Period};
use crate::core::reconciler::Reconciler;

/// Common filter for the side-table list endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SideQuery {
    pub employee_id: Option<i64>,
    #[schema(value_type = String, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(value_type = String, format = "date")]
    pub to: Option<NaiveDate>,
}

pub(crate) fn parse_period(raw: &str) -> actix_web::Result<Period> {
    Period::parse(raw).map_err(ErrorBadRequest)
}

/// Reject unknown employees before any write happens.
pub(crate) async fn ensure_employee(pool: &SqlitePool, employee_id: i64) -> actix_web::Result<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Employee lookup failed");
            ErrorInternalServerError("Database error")
        })?;
    if found.is_none() {
        return Err(ErrorBadRequest(format!("Unknown employee: {}", employee_id)));
    }
    Ok(())
}

/// Mutations recompute the affected day before the response goes out, so
/// the next read already reflects them.
pub(crate) async fn reconcile_date(
    recon: &Reconciler,
    date: NaiveDate,
    employee_id: Option<i64>,
) -> actix_web::Result<()> {
    recon.reconcile_day(LogicalDay::new(date), employee_id).await.map_err(|e| {
        tracing::error!(error = %e, %date, "Post-mutation reconciliation failed");
        ErrorInternalServerError("Reconciliation failed")
    })?;
    Ok(())
}

/// Shared date-range listing for the side tables; they all carry the
/// same (employee_id, day) filter columns.
pub(crate) async fn list_side_rows<T>(
    pool: &SqlitePool,
    table: &str,
    query: &SideQuery,
) -> actix_web::Result<Vec<T>>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let mut sql = format!("SELECT * FROM {} WHERE 1 = 1", table);
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if query.from.is_some() {
        sql.push_str(" AND day >= ?");
    }
    if query.to.is_some() {
        sql.push_str(" AND day <= ?");
    }
    sql.push_str(" ORDER BY day, employee_id");

    let mut q = sqlx::query_as::<_, T>(&sql);
    if let Some(id) = query.employee_id {
        q = q.bind(id);
    }
    if let Some(from) = query.from {
        q = q.bind(from);
    }
    if let Some(to) = query.to {
        q = q.bind(to);
    }

    q.fetch_all(pool).await.map_err(|e| {
        tracing::error!(error = %e, table, "Failed to list side-table rows");
        ErrorInternalServerError("Database error")
    })
}
