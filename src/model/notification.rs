use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    #[schema(example = "pointage")]
    pub kind: String,
    #[schema(example = "Nouveau pointage")]
    pub title: String,
    #[schema(example = "Rachid B. a pointé à 07:25")]
    pub message: String,
    #[schema(nullable = true)]
    pub employee_id: Option<i64>,
    #[schema(nullable = true)]
    pub actor: Option<String>,
    #[schema(nullable = true)]
    pub deep_link: Option<String>,
    /// Stable key preventing re-emission across repeated sync runs.
    #[schema(example = "1@2025-03-04 07:25:00", nullable = true)]
    pub dedup_key: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}
