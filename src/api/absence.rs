use actix_web::error::{ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, list_side_rows, reconcile_date, SideQuery};
use crate::core::classifier::REASON_ABSENCE;
use crate::core::reconciler::Reconciler;
use crate::model::side::AbsentRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};

const ABSENCE_EDITABLE: &[&str] = &["day", "reason"];

#[derive(Deserialize, ToSchema)]
pub struct CreateAbsence {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = "Absence injustifiée", nullable = true)]
    pub reason: Option<String>,
}

/// Record an absence fact. One per employee per day; re-posting the
/// same day replaces the reason.
#[utoipa::path(
    post,
    path = "/api/v1/absences",
    request_body = CreateAbsence,
    responses(
        (status = 200, description = "Absence recorded"),
        (status = 400, description = "Unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Absence"
)]
pub async fn add_absence(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateAbsence>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;

    sqlx::query(
        "INSERT INTO absents (employee_id, day, reason) VALUES (?, ?, ?) \
         ON CONFLICT(employee_id, day) DO UPDATE SET reason = excluded.reason",
    )
    .bind(payload.employee_id)
    .bind(payload.day)
    .bind(payload.reason.as_deref().unwrap_or(REASON_ABSENCE))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to upsert absence");
        ErrorInternalServerError("Database error")
    })?;

    reconcile_date(&recon, payload.day, Some(payload.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Absence recorded" })))
}

/// Update an absence
#[utoipa::path(
    put,
    path = "/api/v1/absences/{id}",
    params(("id", Path, description = "Absence ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Absence updated"),
        (status = 400, description = "Bad column in payload"),
        (status = 404, description = "Absence not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Absence"
)]
pub async fn update_absence(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_absence(pool.get_ref(), id).await?;

    let update = build_update_sql("absents", &body, "id", id, ABSENCE_EDITABLE)?;
    execute_update(pool.get_ref(), update).await.map_err(ErrorInternalServerError)?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    if let Some(new_day) = body.get("day").and_then(Value::as_str) {
        if let Ok(day) = NaiveDate::parse_from_str(new_day, "%Y-%m-%d") {
            if day != existing.day {
                reconcile_date(&recon, day, Some(existing.employee_id)).await?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Absence updated" })))
}

/// Delete an absence
#[utoipa::path(
    delete,
    path = "/api/v1/absences/{id}",
    params(("id", Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence deleted"),
        (status = 404, description = "Absence not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Absence"
)]
pub async fn delete_absence(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_absence(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM absents WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete absence");
            ErrorInternalServerError("Database error")
        })?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Absence deleted" })))
}

/// List absences
#[utoipa::path(
    get,
    path = "/api/v1/absences",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Inclusive lower day bound"),
        ("to", Query, description = "Inclusive upper day bound")
    ),
    responses(
        (status = 200, description = "Matching absences", body = [AbsentRecord])
    ),
    tag = "Absence"
)]
pub async fn list_absences(
    pool: web::Data<SqlitePool>,
    query: web::Query<SideQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = list_side_rows::<AbsentRecord>(pool.get_ref(), "absents", &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_absence(pool: &SqlitePool, id: i64) -> actix_web::Result<AbsentRecord> {
    sqlx::query_as::<_, AbsentRecord>("SELECT * FROM absents WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch absence");
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorNotFound("Absence not found"))
}
