use actix_web::error::{ErrorInternalServerError, ErrorNotFound};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, list_side_rows, reconcile_date, SideQuery};
use crate::core::reconciler::Reconciler;
use crate::model::side::DoublageRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};

const DOUBLAGE_EDITABLE: &[&str] = &["day", "amount", "motive"];

#[derive(Deserialize, ToSchema)]
pub struct CreateDoublage {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 80.0)]
    pub amount: f64,
    #[schema(example = "Doublage samedi", nullable = true)]
    pub motive: Option<String>,
}

/// Record a double-shift bonus
#[utoipa::path(
    post,
    path = "/api/v1/doublages",
    request_body = CreateDoublage,
    responses(
        (status = 200, description = "Doublage recorded", body = Object, example = json!({ "id": 3 })),
        (status = 400, description = "Unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Doublage"
)]
pub async fn add_doublage(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    payload: web::Json<CreateDoublage>,
) -> actix_web::Result<impl Responder> {
    ensure_employee(pool.get_ref(), payload.employee_id).await?;

    let id = sqlx::query("INSERT INTO doublages (employee_id, day, amount, motive) VALUES (?, ?, ?, ?)")
        .bind(payload.employee_id)
        .bind(payload.day)
        .bind(payload.amount)
        .bind(&payload.motive)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert doublage");
            ErrorInternalServerError("Database error")
        })?
        .last_insert_rowid();

    reconcile_date(&recon, payload.day, Some(payload.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

/// Update a doublage
#[utoipa::path(
    put,
    path = "/api/v1/doublages/{id}",
    params(("id", Path, description = "Doublage ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Doublage updated"),
        (status = 400, description = "Bad column in payload"),
        (status = 404, description = "Doublage not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Doublage"
)]
pub async fn update_doublage(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_doublage(pool.get_ref(), id).await?;

    let update = build_update_sql("doublages", &body, "id", id, DOUBLAGE_EDITABLE)?;
    execute_update(pool.get_ref(), update).await.map_err(ErrorInternalServerError)?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    if let Some(new_day) = body.get("day").and_then(Value::as_str) {
        if let Ok(day) = NaiveDate::parse_from_str(new_day, "%Y-%m-%d") {
            if day != existing.day {
                reconcile_date(&recon, day, Some(existing.employee_id)).await?;
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Doublage updated" })))
}

/// Delete a doublage
#[utoipa::path(
    delete,
    path = "/api/v1/doublages/{id}",
    params(("id", Path, description = "Doublage ID")),
    responses(
        (status = 200, description = "Doublage deleted"),
        (status = 404, description = "Doublage not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Doublage"
)]
pub async fn delete_doublage(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let existing = fetch_doublage(pool.get_ref(), id).await?;

    sqlx::query("DELETE FROM doublages WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete doublage");
            ErrorInternalServerError("Database error")
        })?;

    reconcile_date(&recon, existing.day, Some(existing.employee_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Doublage deleted" })))
}

/// List doublages
#[utoipa::path(
    get,
    path = "/api/v1/doublages",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("from", Query, description = "Inclusive lower day bound"),
        ("to", Query, description = "Inclusive upper day bound")
    ),
    responses(
        (status = 200, description = "Matching doublages", body = [DoublageRecord])
    ),
    tag = "Doublage"
)]
pub async fn list_doublages(
    pool: web::Data<SqlitePool>,
    query: web::Query<SideQuery>,
) -> actix_web::Result<impl Responder> {
    let rows = list_side_rows::<DoublageRecord>(pool.get_ref(), "doublages", &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_doublage(pool: &SqlitePool, id: i64) -> actix_web::Result<DoublageRecord> {
    sqlx::query_as::<_, DoublageRecord>("SELECT * FROM doublages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch doublage");
            ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| ErrorNotFound("Doublage not found"))
}
