use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authoritative per-employee-per-day payroll row. Everything else
/// in the system is either raw input or a projection of it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 93,
        "period": "2025_03",
        "employee_id": 1,
        "day": "2025-03-04",
        "present": 1,
        "advance": 0.0,
        "extra": 0.0,
        "prime": 50.0,
        "infraction": 30.0,
        "doublage": 0.0,
        "mise_a_pied_days": 0,
        "retard_minutes": 25,
        "remark": "Retard",
        "clock_in": "07:25",
        "clock_out": "16:00",
        "manually_edited": false,
        "paid": false
    })
)]
pub struct LedgerRow {
    pub id: i64,

    /// Month key, `YYYY_MM`.
    #[schema(example = "2025_03")]
    pub period: String,

    pub employee_id: i64,

    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,

    /// 0 or 1.
    pub present: i64,

    pub advance: f64,
    pub extra: f64,
    pub prime: f64,
    pub infraction: f64,
    pub doublage: f64,

    /// Suspension days parsed from the oldest "mise à pied" record.
    pub mise_a_pied_days: i64,

    pub retard_minutes: i64,

    #[schema(nullable = true)]
    pub remark: Option<String>,

    /// Wall-clock "HH:MM" strings, the presentation the ledger keeps.
    #[schema(example = "07:25", nullable = true)]
    pub clock_in: Option<String>,
    #[schema(example = "16:00", nullable = true)]
    pub clock_out: Option<String>,

    /// Once true, recompute never touches this row again.
    pub manually_edited: bool,

    pub paid: bool,
}
