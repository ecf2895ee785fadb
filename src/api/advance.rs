use actix_web::error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, list_side_rows, reconcile_date, SideQuery};
use crate::core::reconciler::Reconciler;
use crate::model::shift::AdvanceStatus;
use crate::model::side::AdvanceRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};

const ADVANCE_EDITABLE: &[&str] = &["day", "amount", "motive", "status"];

#[derive(Deserialize, ToSchema)]
pub struct CreateAdvance {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 200.0)]
    pub amount: f64,
    #[schema(example = "Avance sur salaire", nullable = true)]
    pub motive: Option<String>,
    /// Defaults to "En attente".
    #[schema(example = "Validé", nullable = true)]
    pub status: Option<AdvanceStatus>,
}

/// Record a salary advance
#[utoipa::path(
    post,
    path = "/api/v1/advances",
    request_body = CreateAdvance,
    responses(
        (status = 200, description = "Advance recorded", body = Object, example = json!({ "id": 12 })),
        (status = 400, description = "Unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Advance"
)]
pub async fn add_advance(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateAdvance>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;
    let status = payload.status.unwrap_or(AdvanceStatus::EnAttente);

    let id = sqlx::query(
        "INSERT INTO advances (employee_id, day, amount, motive, status) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(payload.employee_id)
    .bind(payload.day)
    .bind(payload.amount)
    .bind(&payload.motive)
    .bind(status.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to insert advance");
        ErrorInternalServerError("Database error")
    })?
    .last_insert_rowid();

    reconcile_date(&recon, payload.day, Some(payload.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

/// Update an advance
#[utoipa::path(
    put,
    path = "/api/v1/advances/{id}",
    params(("id", Path, description = "Advance ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Advance updated"),
        (status = 400, description = "Bad column or status"),
        (status = 404, description = "Advance not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Advance"
)]
pub async fn update_advance(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    if let Some(status) = body.get("status").and_then(Value::as_str) {
        status
            .parse::<AdvanceStatus>()
            .map_err(|_| ErrorBadRequest(format!("Unknown status: {}", status)))?;
    }

    let existing = fetch_advance(pool.get_ref(), id).await?;
    let update = build_update_sql("advances", &body, "id", id, ADVANCE_EDITABLE)?;
    execute_update(pool.get_ref(), update).await.map_err(ErrorInternalServerError)?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    // A moved record dirties the target day as well.
    if let Some(new_day) = body.get("day").and_then(Value::as_str) {
        if let Ok(day) = NaiveDate::parse_from_str(new_day, "%Y-%m-%d") {
            if day != existing.day {
                reconcile_date(&recon, day, Some(existing.employee_id)).await?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Advance updated" })))
}

/// Delete an advance
#[utoipa::path(
    delete,
    path = "/api/v1/advances/{id}",
    params(("id", Path, description = "Advance ID")),
    responses(
        (status = 200, description = "Advance deleted"),
        (status = 404, description = "Advance not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Advance"
)]
pub async fn delete_advance(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_advance(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM advances WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete advance");
            ErrorInternalServerError("Database error")
        })?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Advance deleted" })))
}

/// List advances
#[utoipa::path(
    get,
    path = "/api/v1/advances",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Inclusive lower day bound"),
        ("to", Query, description = "Inclusive upper day bound")
    ),
    responses(
        (status = 200, description = "Matching advances", body = [AdvanceRecord])
    ),
    tag = "Advance"
)]
pub async fn list_advances(
    pool: web::Data<SqlitePool>,
    query: web::Query<SideQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = list_side_rows::<AdvanceRecord>(pool.get_ref(), "advances", &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_advance(pool: &SqlitePool, id: i64) -> actix_web::Result<AdvanceRecord> {
    sqlx::query_as::<_, AdvanceRecord>("SELECT * FROM advances WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch advance");
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorNotFound("Advance not found"))
}
