use chrono::Weekday;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::shift::Shift;

/// One row per employee; one shift label per weekday. This is only the
/// *default* — punches observed on the day can override it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ScheduleRow {
    #[schema(example = 1)]
    pub employee_id: i64,
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

impl ScheduleRow {
    pub fn shift_for(&self, weekday: Weekday) -> Shift {
        let label = match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        };
        Shift::from_label(label)
    }

    /// Fallback when an employee has no schedule row yet.
    pub fn all_repos(employee_id: i64) -> Self {
        let repos = Shift::Repos.to_string();
        Self {
            employee_id,
            sunday: repos.clone(),
            monday: repos.clone(),
            tuesday: repos.clone(),
            wednesday: repos.clone(),
            thursday: repos.clone(),
            friday: repos.clone(),
            saturday: repos,
        }
    }
}
