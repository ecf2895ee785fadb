use actix_web::error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, list_side_rows, reconcile_date, SideQuery};
use crate::core::classifier::REASON_RETARD;
use crate::core::reconciler::Reconciler;
use crate::model::side::RetardRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};

const RETARD_EDITABLE: &[&str] = &["day", "minutes", "reason"];

#[derive(Deserialize, ToSchema)]
pub struct CreateRetard {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 25)]
    pub minutes: i64,
    #[schema(example = "Retard", nullable = true)]
    pub reason: Option<String>,
}

/// Record a lateness fact. One per employee per day; a second entry for
/// the same day replaces the first. The next recompute of an unfrozen
/// day may still override it with what the punches say.
#[utoipa::path(
    post,
    path = "/api/v1/retards",
    request_body = CreateRetard,
    responses(
        (status = 200, description = "Retard recorded"),
        (status = 400, description = "Unknown employee or non-positive minutes"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Retard"
)]
pub async fn add_retard(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateRetard>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;
    if payload.minutes <= 0 {
        return Err(ErrorBadRequest("Minutes must be positive"));
    }

    sqlx::query(
        "INSERT INTO retards (employee_id, day, minutes, reason) VALUES (?, ?, ?, ?) \
         ON CONFLICT(employee_id, day) DO UPDATE SET \
         minutes = excluded.minutes, reason = excluded.reason",
    )
    .bind(payload.employee_id)
    .bind(payload.day)
    .bind(payload.minutes)
    .bind(payload.reason.as_deref().unwrap_or(REASON_RETARD))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to upsert retard");
        ErrorInternalServerError("Database error")
    })?;

    reconcile_date(&recon, payload.day, Some(payload.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Retard recorded" })))
}

/// Update a retard
#[utoipa::path(
    put,
    path = "/api/v1/retards/{id}",
    params(("id", Path, description = "Retard ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Retard updated"),
        (status = 400, description = "Bad column in payload"),
        (status = 404, description = "Retard not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Retard"
)]
pub async fn update_retard(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_retard(pool.get_ref(), id).await?;

    let update = build_update_sql("retards", &body, "id", id, RETARD_EDITABLE)?;
    execute_update(pool.get_ref(), update).await.map_err(ErrorInternalServerError)?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    if let Some(new_day) = body.get("day").and_then(Value::as_str) {
        if let Ok(day) = NaiveDate::parse_from_str(new_day, "%Y-%m-%d") {
            if day != existing.day {
                reconcile_date(&recon, day, Some(existing.employee_id)).await?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Retard updated" })))
}

/// Delete a retard
#[utoipa::path(
    delete,
    path = "/api/v1/retards/{id}",
    params(("id", Path, description = "Retard ID")),
    responses(
        (status = 200, description = "Retard deleted"),
        (status = 404, description = "Retard not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Retard"
)]
pub async fn delete_retard(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_retard(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM retards WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete retard");
            ErrorInternalServerError("Database error")
        })?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Retard deleted" })))
}

/// List retards
#[utoipa::path(
    get,
    path = "/api/v1/retards",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Inclusive lower day bound"),
        ("to", Query, description = "Inclusive upper day bound")
    ),
    responses(
        (status = 200, description = "Matching retards", body = [RetardRecord])
    ),
    tag = "Retard"
)]
pub async fn list_retards(
    pool: web::Data<SqlitePool>,
    query: web::Query<SideQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = list_side_rows::<RetardRecord>(pool.get_ref(), "retards", &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_retard(pool: &SqlitePool, id: i64) -> actix_web::Result<RetardRecord> {
    sqlx::query_as::<_, RetardRecord>("SELECT * FROM retards WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch retard");
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorNotFound("Retard not found"))
}
