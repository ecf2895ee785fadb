use std::time::Duration;

use actix_web::error::ErrorInternalServerError;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::Config;
use crate::core::logical_day::LogicalDay;
use crate::core::reconciler::Reconciler;
use crate::core::sync::{self, SyncReport};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncQuery {
    /// Defaults to the currently open logical day.
    #[schema(value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

/// Trigger a recompute of one logical day
#[utoipa::path(
    post,
    path = "/api/v1/sync",
    params(
        ("date", Query, description = "Logical day to recompute, YYYY-MM-DD; defaults to today")
    ),
    responses(
        (status = 200, description = "Recompute ran or was throttled", body = SyncReport),
        (status = 500, description = "Internal server error")
    ),
    tag = "Sync"
)]
pub async fn trigger_sync(
    recon: web::Data<Reconciler>,
    config: web::Data<Config>,
    query: web::Query<SyncQuery>,
) -> actix_web::Result<impl Responder> {
    let day = match query.date {
        Some(date) => LogicalDay::new(date),
        None => LogicalDay::containing(recon.clock().now()),
    };

    let report = sync::run(&recon, day, Duration::from_secs(config.sync_min_gap_secs))
        .await
        .map_err(|e| {
            error!(error = %e, day = %day, "Sync failed");
            ErrorInternalServerError("Sync failed")
        })?;

    Ok(HttpResponse::Ok().json(report))
}
