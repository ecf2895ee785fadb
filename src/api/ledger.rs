use actix_web::error::{ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, parse_period};
use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::{bucket_extras, Reconciler};
use crate::model::ledger::LedgerRow;
use crate::model::shift::AdvanceStatus;
use crate::utils::duration_fmt::format_minutes;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LedgerQuery {
    pub employee_id: Option<i64>,
}

/// Month-to-date totals straight from the side tables, so entries made
/// moments ago are visible even before the next recompute lands them on
/// the ledger rows.
#[derive(Serialize, ToSchema)]
pub struct MonthTotals {
    pub employee_id: i64,
    pub advance: f64,
    pub extra: f64,
    pub prime: f64,
    pub infraction: f64,
    pub doublage: f64,
    pub retard_minutes: i64,
    #[schema(example = "1h 05m")]
    pub retard: String,
}

#[derive(Serialize, ToSchema)]
pub struct LedgerResponse {
    #[schema(example = "2025_03")]
    pub period: String,
    pub rows: Vec<LedgerRow>,
    pub totals: Vec<MonthTotals>,
}

#[derive(Deserialize, ToSchema)]
pub struct PardonRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct PayRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    /// Omitted means marking the month as paid.
    pub paid: Option<bool>,
}

/// Month ledger with live side-table totals
#[utoipa::path(
    get,
    path = "/api/v1/ledger/{period}",
    params(
        ("period", Path, description = "Month key, YYYY_MM"),
        ("employee_id", Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "Ledger rows and month-to-date totals", body = LedgerResponse),
        (status = 400, description = "Malformed period key")
    ),
    tag = "Ledger"
)]
pub async fn get_ledger(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<String>,
    query: web::Query<LedgerQuery>,
) -> actix_web::Result<impl Responder> {
    let period = parse_period(&path.into_inner())?;
    let key = match query.employee_id {
        Some(id) => format!("ledger:{}:{}", period.key(), id),
        None => format!("ledger:{}:all", period.key()),
    };

    if let Some(body) = recon.cache().get(&key).await {
        return Ok(HttpResponse::Ok().json(body));
    }

    recon.provisioner().ensure(period).await.map_err(|e| {
        error!(error = %e, period = %period.key(), "Provisioning failed");
        ErrorInternalServerError("Provisioning failed")
    })?;

    let mut sql =
        String::from("SELECT * FROM ledger WHERE period = ?");
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    sql.push_str(" ORDER BY employee_id, day");

    let mut rows_query = sqlx::query_as::<_, LedgerRow>(&sql).bind(period.key());
    if let Some(id) = query.employee_id {
        rows_query = rows_query.bind(id);
    }
    let rows = rows_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, period = %period.key(), "Failed to fetch ledger rows");
        ErrorInternalServerError("Database error")
    })?;

    let mut employee_ids: Vec<i64> = rows.iter().map(|r| r.employee_id).collect();
    employee_ids.dedup();

    let mut totals = Vec::with_capacity(employee_ids.len());
    for employee_id in employee_ids {
        totals.push(month_totals(pool.get_ref(), period, employee_id).await.map_err(|e| {
            error!(error = %e, employee_id, "Failed to aggregate month totals");
            ErrorInternalServerError("Database error")
        })?);
    }

    let body = serde_json::to_value(LedgerResponse { period: period.key(), rows, totals })
        .map_err(ErrorInternalServerError)?;

    let today = LogicalDay::containing(recon.clock().now()).date();
    recon.cache().put(key, body.clone(), period.contains(today)).await;

    Ok(HttpResponse::Ok().json(body))
}

async fn month_totals(
    pool: &SqlitePool,
    period: crate::core::logical_day::Period,
    employee_id: i64,
) -> sqlx::Result<MonthTotals> {
    let (first, last) = (period.first_day(), period.last_day());

    let advance: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM advances \
         WHERE employee_id = ? AND day BETWEEN ? AND ? AND status IN (?, ?, ?)",
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .bind(AdvanceStatus::COUNTABLE[0])
    .bind(AdvanceStatus::COUNTABLE[1])
    .bind(AdvanceStatus::COUNTABLE[2])
    .fetch_one(pool)
    .await?;

    let doublage: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM doublages \
         WHERE employee_id = ? AND day BETWEEN ? AND ?",
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_one(pool)
    .await?;

    let extras: Vec<(f64, String)> = sqlx::query_as(
        "SELECT amount, motive FROM extras \
         WHERE employee_id = ? AND day BETWEEN ? AND ? ORDER BY id",
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;
    let buckets = bucket_extras(&extras);

    let retard_minutes: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(minutes), 0) FROM retards \
         WHERE employee_id = ? AND day BETWEEN ? AND ?",
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_one(pool)
    .await?;

    Ok(MonthTotals {
        employee_id,
        advance,
        extra: buckets.extra,
        prime: buckets.prime,
        infraction: buckets.manual_infraction.unwrap_or(0.0),
        doublage,
        retard_minutes,
        retard: format_minutes(retard_minutes),
    })
}

/// Manual override of one ledger row
#[utoipa::path(
    put,
    path = "/api/v1/ledger/{period}/{row_id}",
    params(
        ("period", Path, description = "Month key, YYYY_MM"),
        ("row_id", Path, description = "Ledger row ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Row overridden and frozen", body = Object, example = json!({
            "message": "Ledger row updated"
        })),
        (status = 400, description = "Unknown or protected column in payload"),
        (status = 404, description = "Row not found in that period"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Ledger"
)]
pub async fn edit_ledger_row(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<(String, i64)>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let (raw_period, row_id) = path.into_inner();
    let period = parse_period(&raw_period)?;

    let row: Option<LedgerRow> = sqlx::query_as("SELECT * FROM ledger WHERE id = ?")
        .bind(row_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, row_id, "Failed to fetch ledger row");
            ErrorInternalServerError("Database error")
        })?;

    let row = match row {
        Some(r) if r.period == period.key() => r,
        _ => return Err(ErrorNotFound("Ledger row not found")),
    };

    recon.apply_manual_edit(&row, &body).await.map_err(|e| {
        error!(error = %e, row_id, "Manual ledger edit failed");
        ErrorInternalServerError("Manual edit failed")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Ledger row updated" })))
}

/// Pardon one employee-day
#[utoipa::path(
    post,
    path = "/api/v1/ledger/pardon",
    request_body = PardonRequest,
    responses(
        (status = 200, description = "Day pardoned and frozen", body = Object, example = json!({
            "message": "Day pardoned"
        })),
        (status = 400, description = "Unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Ledger"
)]
pub async fn pardon(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<PardonRequest>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;

    recon.pardon(payload.employee_id, LogicalDay::new(payload.date)).await.map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, date = %payload.date, "Pardon failed");
        ErrorInternalServerError("Pardon failed")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Day pardoned" })))
}

/// Mark a month slice paid or unpaid
#[utoipa::path(
    post,
    path = "/api/v1/ledger/{period}/pay",
    params(
        ("period", Path, description = "Month key, YYYY_MM")
    ),
    request_body = PayRequest,
    responses(
        (status = 200, description = "Paid flag updated", body = Object, example = json!({
            "affected": 31
        })),
        (status = 400, description = "Unknown employee or malformed period"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Ledger"
)]
pub async fn pay(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<String>,
    payload: web::Json<PayRequest>,
) -> actix_web::Result<impl Responder> {
    let period = parse_period(&path.into_inner())?;
    ensure_employee(pool.get_ref(), payload.employee_id).await?;

    let affected = recon
        .set_paid(period, payload.employee_id, payload.paid.unwrap_or(true))
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = payload.employee_id, "Failed to flip paid flag");
            ErrorInternalServerError("Payment update failed")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "affected": affected })))
}

/// Provision a month's ledger grid
#[utoipa::path(
    post,
    path = "/api/v1/ledger/{period}/provision",
    params(
        ("period", Path, description = "Month key, YYYY_MM")
    ),
    responses(
        (status = 200, description = "Grid exists", body = Object, example = json!({
            "message": "Period provisioned",
            "period": "2025_03"
        })),
        (status = 400, description = "Malformed period key"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Ledger"
)]
pub async fn provision(
    recon: web::Data<Reconciler>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let period = parse_period(&path.into_inner())?;

    recon.provisioner().ensure(period).await.map_err(|e| {
        error!(error = %e, period = %period.key(), "Provisioning failed");
        ErrorInternalServerError("Provisioning failed")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Period provisioned", "period": period.key() })))
}
