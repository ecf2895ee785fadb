use chrono::NaiveTime;

use crate::config::Config;
use crate::model::shift::Shift;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid rule time")
}

/// Every hand-tuned attendance threshold, in one place. The historical
/// values were scattered constants; here they are named and, for the
/// business-facing ones, overridable from the environment.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Shift-start reference for Matin and Doublage.
    pub morning_start: NaiveTime,
    /// Nominal Matin end, used when a pardon fabricates clock times.
    pub morning_end: NaiveTime,
    /// Shift-start reference for Soir.
    pub evening_start: NaiveTime,
    pub evening_end: NaiveTime,
    pub doublage_end: NaiveTime,

    /// First punch at or after this hour reads as a Soir shift.
    pub soir_first_punch_hour: u32,
    /// A closed session longer than this many hours is a Doublage.
    pub doublage_session_hours: i64,
    /// An open session longer than this many hours is a Doublage.
    pub ongoing_doublage_hours: i64,
    /// An open session also reads as Doublage at evening/night hours.
    pub ongoing_evening_hour: u32,
    pub ongoing_morning_hour: u32,

    /// Minutes past shift start before a no-show counts as absent.
    pub grace_minutes: i64,
    /// Lateness beyond this many minutes triggers the automatic penalty.
    pub retard_threshold_minutes: i64,
    pub infraction_penalty: f64,

    /// Department running the split-shift exception.
    pub chef_department: String,
    pub chef_first_start: NaiveTime,
    pub chef_second_start: NaiveTime,
    /// Punches before this time belong to the chef's first window.
    pub chef_first_window_until: NaiveTime,
    /// The chef's second window opens here; a punch at exactly this time
    /// is the first window's exit, not the second window's entry.
    pub chef_second_from: NaiveTime,

    /// Sensor double-fires closer than this many minutes are dropped.
    pub punch_dedup_minutes: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            morning_start: t(7, 0),
            morning_end: t(15, 0),
            evening_start: t(16, 0),
            evening_end: t(23, 0),
            doublage_end: t(23, 0),
            soir_first_punch_hour: 15,
            doublage_session_hours: 14,
            ongoing_doublage_hours: 10,
            ongoing_evening_hour: 18,
            ongoing_morning_hour: 7,
            grace_minutes: 30,
            retard_threshold_minutes: 10,
            infraction_penalty: 30.0,
            chef_department: "Chef_Cuisine".to_string(),
            chef_first_start: t(11, 0),
            chef_second_start: t(19, 0),
            chef_first_window_until: t(15, 0),
            chef_second_from: t(16, 0),
            punch_dedup_minutes: 5,
        }
    }
}

impl Rules {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            grace_minutes: cfg.grace_minutes,
            retard_threshold_minutes: cfg.retard_threshold_minutes,
            infraction_penalty: cfg.infraction_penalty,
            chef_department: cfg.chef_department.clone(),
            punch_dedup_minutes: cfg.punch_dedup_minutes,
            ..Self::default()
        }
    }

    /// Reference start used for lateness, keyed by observed shift.
    pub fn reference_start(&self, shift: Shift) -> NaiveTime {
        match shift {
            Shift::Soir => self.evening_start,
            _ => self.morning_start,
        }
    }

    /// Nominal boundaries a pardon writes back as clock times.
    pub fn nominal_window(&self, shift: Shift) -> (NaiveTime, NaiveTime) {
        match shift {
            Shift::Soir => (self.evening_start, self.evening_end),
            Shift::Doublage => (self.morning_start, self.doublage_end),
            _ => (self.morning_start, self.morning_end),
        }
    }
}
