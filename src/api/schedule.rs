use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{ensure_employee, reconcile_date};
use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::Reconciler;
use crate::model::schedule::ScheduleRow;
use crate::model::shift::Shift;

#[derive(Deserialize, ToSchema)]
pub struct SetSchedule {
    #[schema(example = "Repos")]
    pub sunday: String,
    #[schema(example = "Matin")]
    pub monday: String,
    #[schema(example = "Matin")]
    pub tuesday: String,
    #[schema(example = "Matin")]
    pub wednesday: String,
    #[schema(example = "Soir")]
    pub thursday: String,
    #[schema(example = "Soir")]
    pub friday: String,
    #[schema(example = "Doublage")]
    pub saturday: String,
}

impl SetSchedule {
    fn labels(&self) -> [&String; 7] {
        [
            &self.sunday,
            &self.monday,
            &self.tuesday,
            &self.wednesday,
            &self.thursday,
            &self.friday,
            &self.saturday,
        ]
    }
}

/// Weekly schedule for one employee
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Schedule, all-Repos when never set", body = ScheduleRow),
        (status = 400, description = "Unknown employee")
    ),
    tag = "Schedule"
)]
pub async fn get_schedule(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    ensure_employee(pool.get_ref(), employee_id).await?;

    let row: Option<ScheduleRow> = sqlx::query_as("SELECT * FROM schedules WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch schedule");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(row.unwrap_or_else(|| ScheduleRow::all_repos(employee_id))))
}

/// Replace an employee's weekly schedule
#[utoipa::path(
    put,
    path = "/api/v1/schedules/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = SetSchedule,
    responses(
        (status = 200, description = "Schedule saved"),
        (status = 400, description = "Unknown employee or shift label"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule"
)]
pub async fn set_schedule(
    pool: web::Data<SqlitePool>,
    recon: web::Data<Reconciler>,
    path: web::Path<i64>,
    payload: web::Json<SetSchedule>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    ensure_employee(pool.get_ref(), employee_id).await?;

    for label in payload.labels() {
        label
            .parse::<Shift>()
            .map_err(|_| ErrorBadRequest(format!("Unknown shift label: {}", label)))?;
    }

    sqlx::query(
        "INSERT INTO schedules \
         (employee_id, sunday, monday, tuesday, wednesday, thursday, friday, saturday) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(employee_id) DO UPDATE SET \
         sunday = excluded.sunday, monday = excluded.monday, tuesday = excluded.tuesday, \
         wednesday = excluded.wednesday, thursday = excluded.thursday, \
         friday = excluded.friday, saturday = excluded.saturday",
    )
    .bind(employee_id)
    .bind(&payload.sunday)
    .bind(&payload.monday)
    .bind(&payload.tuesday)
    .bind(&payload.wednesday)
    .bind(&payload.thursday)
    .bind(&payload.friday)
    .bind(&payload.saturday)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to save schedule");
        ErrorInternalServerError("Database error")
    })?;

    // The open day's verdict may depend on the schedule that just changed.
    let today = LogicalDay::containing(recon.clock().now());
    reconcile_date(&recon, today.date(), Some(employee_id)).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Schedule saved" })))
}
