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
use crate::model::side::ExtraRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};

const EXTRA_EDITABLE: &[&str] = &["day", "amount", "motive"];

#[derive(Deserialize, ToSchema)]
pub struct CreateExtra {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 50.0)]
    pub amount: f64,
    /// The prefix decides the ledger bucket: "prime", "infraction",
    /// "mise à pied N jours", or anything else for a plain extra.
    #[schema(example = "prime de service")]
    pub motive: String,
}

/// Record an extra payment or penalty
#[utoipa::path(
    post,
    path = "/api/v1/extras",
    request_body = CreateExtra,
    responses(
        (status = 200, description = "Extra recorded", body = Object, example = json!({ "id": 4 })),
        (status = 400, description = "Unknown employee or empty motive"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Extra"
)]
pub async fn add_extra(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateExtra>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;
    if payload.motive.trim().is_empty() {
        return Err(ErrorBadRequest("Motive must not be empty"));
    }

    let id = sqlx::query("INSERT INTO extras (employee_id, day, amount, motive) VALUES (?, ?, ?, ?)")
        .bind(payload.employee_id)
        .bind(payload.day)
        .bind(payload.amount)
        .bind(payload.motive.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert extra");
            ErrorInternalServerError("Database error")
        })?
        .last_insert_rowid();

    reconcile_date(&recon, payload.day, Some(payload.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

/// Update an extra
#[utoipa::path(
    put,
    path = "/api/v1/extras/{id}",
    params(("id", Path, description = "Extra ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Extra updated"),
        (status = 400, description = "Bad column in payload"),
        (status = 404, description = "Extra not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Extra"
)]
pub async fn update_extra(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_extra(pool.get_ref(), id).await?;

    let update = build_update_sql("extras", &body, "id", id, EXTRA_EDITABLE)?;
    execute_update(pool.get_ref(), update).await.map_err(ErrorInternalServerError)?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    if let Some(new_day) = body.get("day").and_then(Value::as_str) {
        if let Ok(day) = NaiveDate::parse_from_str(new_day, "%Y-%m-%d") {
            if day != existing.day {
                reconcile_date(&recon, day, Some(existing.employee_id)).await?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Extra updated" })))
}

/// Delete an extra
#[utoipa::path(
    delete,
    path = "/api/v1/extras/{id}",
    params(("id", Path, description = "Extra ID")),
    responses(
        (status = 200, description = "Extra deleted"),
        (status = 404, description = "Extra not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Extra"
)]
pub async fn delete_extra(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_extra(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM extras WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete extra");
            ErrorInternalServerError("Database error")
        })?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Extra deleted" })))
}

/// List extras
#[utoipa::path(
    get,
    path = "/api/v1/extras",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Inclusive lower day bound"),
        ("to", Query, description = "Inclusive upper day bound")
    ),
    responses(
        (status = 200, description = "Matching extras", body = [ExtraRecord])
    ),
    tag = "Extra"
)]
pub async fn list_extras(
    pool: web::Data<SqlitePool>,
    query: web::Query<SideQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = list_side_rows::<ExtraRecord>(pool.get_ref(), "extras", &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_extra(pool: &SqlitePool, id: i64) -> actix_web::Result<ExtraRecord> {
    sqlx::query_as::<_, ExtraRecord>("SELECT * FROM extras WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch extra");
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorNotFound("Extra not found"))
}
