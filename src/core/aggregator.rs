use chrono::Duration;
use sqlx::SqlitePool;

use crate::core::logical_day::LogicalDay;
use crate::model::punch::Punch;

/// Drop sensor double-fires: any punch closer than `window_minutes` to
/// the previously kept punch of the same employee is discarded. Input
/// must already be ordered by (employee_id, punched_at).
pub fn dedupe_punches(punches: Vec<Punch>, window_minutes: i64) -> Vec<Punch> {
    let window = Duration::minutes(window_minutes);
    let mut kept: Vec<Punch> = Vec::with_capacity(punches.len());
    for punch in punches {
        let double_fire = kept
            .last()
            .filter(|prev| prev.employee_id == punch.employee_id)
            .is_some_and(|prev| punch.punched_at - prev.punched_at < window);
        if !double_fire {
            kept.push(punch);
        }
    }
    kept
}

/// Ordered, deduplicated punches for one logical day. The raw feed is
/// keyed by calendar date, so the lookup covers the two dates the
/// 04:00–04:00 window spans; a date with no rows yet simply reads as
/// zero punches.
pub async fn punches_for_day(
    pool: &SqlitePool,
    day: LogicalDay,
    employee_id: Option<i64>,
    dedup_minutes: i64,
) -> sqlx::Result<Vec<Punch>> {
    let (start, end) = day.window();
    let mut sql = String::from(
        "SELECT id, employee_id, punched_at, punch_day, source \
         FROM punches \
         WHERE punch_day IN (?, ?) AND punched_at >= ? AND punched_at < ?",
    );
    if employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    sql.push_str(" ORDER BY employee_id, punched_at");

    let mut query = sqlx::query_as::<_, Punch>(&sql)
        .bind(day.date())
        .bind(day.date() + Duration::days(1))
        .bind(start)
        .bind(end);
    if let Some(id) = employee_id {
        query = query.bind(id);
    }

    let raw = query.fetch_all(pool).await?;
    Ok(dedupe_punches(raw, dedup_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn punch(employee_id: i64, s: &str) -> Punch {
        let punched_at = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Punch {
            id: 0,
            employee_id,
            punched_at,
            punch_day: punched_at.date(),
            source: "biometric".to_string(),
        }
    }

    #[test]
    fn double_fire_within_five_minutes_is_dropped() {
        let kept = dedupe_punches(
            vec![
                punch(1, "2025-03-04 07:00:00"),
                punch(1, "2025-03-04 07:02:00"),
                punch(1, "2025-03-04 07:10:00"),
            ],
            5,
        );
        let times: Vec<_> = kept.iter().map(|p| p.punched_at.time().to_string()).collect();
        assert_eq!(times, vec!["07:00:00", "07:10:00"]);
    }

    #[test]
    fn dedup_is_per_employee() {
        let kept = dedupe_punches(
            vec![
                punch(1, "2025-03-04 07:00:00"),
                punch(2, "2025-03-04 07:01:00"),
                punch(2, "2025-03-04 07:03:00"),
            ],
            5,
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].employee_id, 2);
    }

    #[test]
    fn exactly_the_window_apart_is_kept() {
        let kept = dedupe_punches(
            vec![punch(1, "2025-03-04 07:00:00"), punch(1, "2025-03-04 07:05:00")],
            5,
        );
        assert_eq!(kept.len(), 2);
    }
}
