use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One biometric clock event. Immutable once ingested, except for the
/// single administrative correction described on the ledger edit path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Punch {
    #[schema(example = 17)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2025-03-04T07:25:00", value_type = String, format = "date-time")]
    pub punched_at: NaiveDateTime,

    /// Calendar day of the raw timestamp; the storage key the feed
    /// partitions on. Logical-day assignment happens at read time.
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub punch_day: NaiveDate,

    #[schema(example = "biometric")]
    pub source: String,
}
