use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Rachid B.",
        "department": "Cuisine",
        "salary": 4200.0,
        "divisor": 26,
        "blocked": false
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Rachid B.")]
    pub name: String,

    #[schema(example = "Cuisine")]
    pub department: String,

    /// Base monthly salary.
    #[schema(example = 4200.0)]
    pub salary: f64,

    /// Contractual working-days divisor; None means the calendar
    /// day-count of the month applies.
    #[schema(example = 26, nullable = true)]
    pub divisor: Option<i64>,

    /// A blocked employee is skipped by the reconciler entirely.
    #[schema(example = false)]
    pub blocked: bool,
}
