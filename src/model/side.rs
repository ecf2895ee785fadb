use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Detected or manually entered lateness fact, one per employee per day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RetardRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 25)]
    pub minutes: i64,
    #[schema(example = "Retard")]
    pub reason: String,
}

/// Detected or manually entered absence fact, one per employee per day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AbsentRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = "Absence injustifiée")]
    pub reason: String,
}

/// Salary advance tied to a specific day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AdvanceRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 200.0)]
    pub amount: f64,
    #[schema(example = "Avance sur salaire", nullable = true)]
    pub motive: Option<String>,
    #[schema(example = "Validé")]
    pub status: String,
}

/// Extra payment or penalty; the motive prefix decides the ledger
/// bucket it folds into ("prime", "infraction", "mise à pied", other).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ExtraRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 50.0)]
    pub amount: f64,
    #[schema(example = "prime de service")]
    pub motive: String,
}

/// Double-shift bonus record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DoublageRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(example = "2025-03-04", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 80.0)]
    pub amount: f64,
    #[schema(example = "Doublage samedi", nullable = true)]
    pub motive: Option<String>,
}
