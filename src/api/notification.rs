use actix_web::error::ErrorInternalServerError;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::notification::Notification;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationQuery {
    pub employee_id: Option<i64>,
    /// Newest-first page size, capped at 500.
    pub limit: Option<i64>,
}

/// Recent notifications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("limit", Query, description = "Page size, default 50, max 500")
    ),
    responses(
        (status = 200, description = "Notification feed", body = [Notification])
    ),
    tag = "Notification"
)]
pub async fn list_notifications(
    pool: web::Data<SqlitePool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let mut sql = String::from("SELECT * FROM notifications WHERE 1 = 1");
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?");

    let mut q = sqlx::query_as::<_, Notification>(&sql);
    if let Some(id) = query.employee_id {
        q = q.bind(id);
    }
    q = q.bind(limit);

    let rows = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to list notifications");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}
