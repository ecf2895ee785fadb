use std::collections::BTreeSet;

use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, reconcile_date};
use crate::core::aggregator;
use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::Reconciler;
use crate::model::punch::Punch;

#[derive(Deserialize, ToSchema)]
pub struct NewPunch {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04T07:25:00", value_type = String, format = "date-time")]
    pub punched_at: NaiveDateTime,
    #[schema(example = "biometric", nullable = true)]
    pub source: Option<String>,
}

/// The biometric bridge flushes in batches, so the endpoint takes one.
#[derive(Deserialize, ToSchema)]
pub struct IngestPunches {
    pub punches: Vec<NewPunch>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PunchQuery {
    pub employee_id: Option<i64>,
}

/// Ingest a batch of punches
#[utoipa::path(
    post,
    path = "/api/v1/punches",
    request_body = IngestPunches,
    responses(
        (status = 200, description = "Batch stored and touched days recomputed", body = Object, example = json!({
            "inserted": 4,
            "days": ["2025-03-04"]
        })),
        (status = 400, description = "Empty batch or unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Punch"
)]
pub async fn ingest_punches(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<IngestPunches>,
) -> actix_web::Result<impl Responder> {
    if payload.punches.is_empty() {
        return Err(ErrorBadRequest("Empty punch batch"));
    }

    let employee_ids: BTreeSet<i64> = payload.punches.iter().map(|p| p.employee_id).collect();
    for id in &employee_ids {
        ensure_employee(pool.get_ref(), *id).await?;
    }

    let mut touched: BTreeSet<NaiveDate> = BTreeSet::new();
    for punch in &payload.punches {
        sqlx::query(
            "INSERT INTO punches (employee_id, punched_at, punch_day, source) VALUES (?, ?, ?, ?)",
        )
        .bind(punch.employee_id)
        .bind(punch.punched_at)
        .bind(punch.punched_at.date())
        .bind(punch.source.as_deref().unwrap_or("biometric"))
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = punch.employee_id, "Failed to insert punch");
            ErrorInternalServerError("Database error")
        })?;

        touched.insert(LogicalDay::containing(punch.punched_at).date());
    }

    for date in &touched {
        reconcile_date(&recon, *date, None).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "inserted": payload.punches.len(),
        "days": touched,
    })))
}

/// Deduplicated punches for one logical day
#[utoipa::path(
    get,
    path = "/api/v1/punches/{date}",
    params(
        ("date", Path, description = "Logical day, YYYY-MM-DD"),
        ("employee_id", Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "Ordered punches of the 04:00-04:00 window", body = [Punch]),
        (status = 400, description = "Malformed date")
    ),
    tag = "Punch"
)]
pub async fn list_punches(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<String>,
    query: web::Query<PunchQuery>,
) -> actix_web::Result<impl Responder> {
    let date = NaiveDate::parse_from_str(&path.into_inner(), "%Y-%m-%d")
        .map_err(|_| ErrorBadRequest("Expected date as YYYY-MM-DD"))?;

    let punches = aggregator::punches_for_day(
        pool.get_ref(),
        LogicalDay::new(date),
        query.employee_id,
        recon.rules().punch_dedup_minutes,
    )
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch punches");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(punches))
}
