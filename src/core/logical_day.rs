use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Attendance days roll over at 04:00, not midnight. A punch at 03:59
/// belongs to the previous calendar date's logical day.
pub const DAY_ROLLOVER_HOUR: u32 = 4;

fn rollover_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DAY_ROLLOVER_HOUR, 0, 0).expect("valid rollover time")
}

/// The 24h window from 04:00 on its date to 04:00 on the next date.
/// All attendance accounting is keyed by this, never by calendar date.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[display(fmt = "{}", _0)]
pub struct LogicalDay(NaiveDate);

impl LogicalDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Logical day a timestamp falls into.
    pub fn containing(ts: NaiveDateTime) -> Self {
        if ts.time() < rollover_time() {
            Self(ts.date() - Duration::days(1))
        } else {
            Self(ts.date())
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// [start, end) bounds of the window.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.0.and_time(rollover_time());
        (start, start + Duration::days(1))
    }

    /// A wall-clock time anchored on this logical day's date.
    pub fn at(&self, time: NaiveTime) -> NaiveDateTime {
        self.0.and_time(time)
    }

    pub fn period(&self) -> Period {
        Period::of(self.0)
    }
}

#[derive(Debug, Display)]
#[display(fmt = "invalid period '{}': expected YYYY_MM", _0)]
pub struct PeriodParseError(String);

impl std::error::Error for PeriodParseError {}

/// Month key, rendered as `YYYY_MM` everywhere a month is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let bad = || PeriodParseError(s.to_string());
        let (y, m) = s.split_once('_').ok_or_else(bad)?;
        let year: i32 = y.parse().map_err(|_| bad())?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) || !(2000..=2100).contains(&year) {
            return Err(bad());
        }
        Ok(Self { year, month })
    }

    pub fn key(&self) -> String {
        format!("{:04}_{:02}", self.year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("valid period")
    }

    pub fn last_day(&self) -> NaiveDate {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.expect("valid period") - Duration::days(1)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(31);
        let mut d = self.first_day();
        let last = self.last_day();
        while d <= last {
            days.push(d);
            d += Duration::days(1);
        }
        days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn punch_before_rollover_belongs_to_previous_day() {
        let day = LogicalDay::containing(ts("2024-05-02 03:59:00"));
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn punch_after_rollover_belongs_to_same_day() {
        let day = LogicalDay::containing(ts("2024-05-02 04:01:00"));
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn window_spans_two_calendar_dates() {
        let day = LogicalDay::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let (start, end) = day.window();
        assert_eq!(start, ts("2024-05-01 04:00:00"));
        assert_eq!(end, ts("2024-05-02 04:00:00"));
    }

    #[test]
    fn period_key_round_trip() {
        let p = Period::parse("2025_03").unwrap();
        assert_eq!(p.key(), "2025_03");
        assert_eq!(p.days().len(), 31);
        assert!(Period::parse("2025-03").is_err());
        assert!(Period::parse("2025_13").is_err());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let p = Period::parse("2024_12").unwrap();
        assert_eq!(p.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
