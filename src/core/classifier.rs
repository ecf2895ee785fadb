use chrono::{Duration, NaiveDateTime, Timelike};

use crate::core::logical_day::LogicalDay;
use crate::core::rules::Rules;
use crate::model::shift::Shift;

pub const REASON_ABSENCE: &str = "Absence injustifiée";
pub const REASON_MISSING_EXIT: &str = "Pointage de sortie manquant";
pub const REASON_RETARD: &str = "Retard";

/// Everything the classifier is allowed to look at. `now` is injected;
/// the function never reads the ambient clock.
pub struct DayContext<'a> {
    pub day: LogicalDay,
    pub scheduled: Shift,
    pub department: &'a str,
    /// Ordered, deduplicated punch times for this employee and day.
    pub punches: &'a [NaiveDateTime],
    pub now: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub shift: Shift,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub absent: bool,
    pub retard_minutes: i64,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn present(&self) -> bool {
        !self.absent && self.clock_in.is_some()
    }

    fn rest_day(scheduled: Shift) -> Self {
        Self {
            shift: scheduled,
            clock_in: None,
            clock_out: None,
            absent: false,
            retard_minutes: 0,
            reason: None,
        }
    }
}

/// Pure shift/lateness/absence classification for one employee-day.
pub fn classify(rules: &Rules, ctx: &DayContext) -> Verdict {
    let in_past = ctx.day < LogicalDay::containing(ctx.now);
    let is_chef = ctx.department == rules.chef_department;

    if ctx.punches.is_empty() {
        if ctx.scheduled == Shift::Repos {
            return Verdict::rest_day(Shift::Repos);
        }
        return no_show(rules, ctx, in_past, is_chef);
    }

    let first = ctx.punches[0];
    let last = *ctx.punches.last().unwrap_or(&first);
    let odd = ctx.punches.len() % 2 == 1;
    let shift = observed_shift(rules, first, last, odd, ctx.now);

    // A missing exit on a closed day beats any lateness reading; the
    // session length cannot be trusted. Chefs run four-punch days, an
    // odd count mid-rotation is routine, so the rule skips them.
    if !is_chef && odd && in_past {
        return Verdict {
            shift,
            clock_in: Some(first),
            clock_out: None,
            absent: true,
            retard_minutes: 0,
            reason: Some(REASON_MISSING_EXIT.to_string()),
        };
    }

    let retard_minutes = if is_chef {
        chef_lateness(rules, ctx)
    } else {
        let reference = ctx.day.at(rules.reference_start(shift));
        (first - reference).num_minutes().max(0)
    };

    Verdict {
        shift,
        clock_in: Some(first),
        clock_out: (!odd).then_some(last),
        absent: false,
        retard_minutes,
        reason: (retard_minutes > 0).then(|| REASON_RETARD.to_string()),
    }
}

fn no_show(rules: &Rules, ctx: &DayContext, in_past: bool, is_chef: bool) -> Verdict {
    let reference = if is_chef {
        rules.chef_first_start
    } else {
        rules.reference_start(ctx.scheduled)
    };
    let deadline = ctx.day.at(reference) + Duration::minutes(rules.grace_minutes);
    let absent = in_past || ctx.now >= deadline;
    Verdict {
        shift: ctx.scheduled,
        clock_in: None,
        clock_out: None,
        absent,
        retard_minutes: 0,
        reason: absent.then(|| REASON_ABSENCE.to_string()),
    }
}

fn observed_shift(
    rules: &Rules,
    first: NaiveDateTime,
    last: NaiveDateTime,
    odd: bool,
    now: NaiveDateTime,
) -> Shift {
    if first.hour() >= rules.soir_first_punch_hour {
        return Shift::Soir;
    }
    if odd {
        // Session still open: judge by elapsed time and time of day.
        let elapsed = now - first;
        if elapsed > Duration::hours(rules.ongoing_doublage_hours)
            || now.hour() >= rules.ongoing_evening_hour
            || now.hour() < rules.ongoing_morning_hour
        {
            Shift::Doublage
        } else {
            Shift::Matin
        }
    } else if last - first > Duration::hours(rules.doublage_session_hours) {
        Shift::Doublage
    } else {
        Shift::Matin
    }
}

/// Chef_Cuisine split shift: two fixed windows, each judged against its
/// own start. A punch at exactly the window boundary is the first
/// window's exit, not the second window's entry.
fn chef_lateness(rules: &Rules, ctx: &DayContext) -> i64 {
    let first_start = ctx.day.at(rules.chef_first_start);
    let second_open = ctx.day.at(rules.chef_second_from);
    let second_start = ctx.day.at(rules.chef_second_start);

    let w1 = ctx.punches.iter().find(|p| **p < ctx.day.at(rules.chef_first_window_until));
    let w2 = ctx.punches.iter().find(|p| **p > second_open);

    let l1 = w1.map(|p| (*p - first_start).num_minutes().max(0)).unwrap_or(0);
    let l2 = w2.map(|p| (*p - second_start).num_minutes().max(0)).unwrap_or(0);
    l1 + l2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day() -> LogicalDay {
        LogicalDay::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap())
    }

    fn ctx<'a>(
        scheduled: Shift,
        department: &'a str,
        punches: &'a [NaiveDateTime],
        now: NaiveDateTime,
    ) -> DayContext<'a> {
        DayContext { day: day(), scheduled, department, punches, now }
    }

    #[test]
    fn matin_lateness_counts_from_seven() {
        let punches = [ts("2025-03-04 07:25:00"), ts("2025-03-04 16:00:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Matin, "Cuisine", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.shift, Shift::Matin);
        assert_eq!(v.retard_minutes, 25);
        assert!(v.present());
        assert_eq!(v.clock_out, Some(ts("2025-03-04 16:00:00")));
    }

    #[test]
    fn early_arrival_is_zero_lateness() {
        let punches = [ts("2025-03-04 06:40:00"), ts("2025-03-04 14:00:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Matin, "Cuisine", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.retard_minutes, 0);
        assert_eq!(v.reason, None);
    }

    #[test]
    fn first_punch_after_fifteen_reads_as_soir() {
        let punches = [ts("2025-03-04 16:05:00"), ts("2025-03-04 23:10:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Soir, "Salle", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.shift, Shift::Soir);
        assert_eq!(v.retard_minutes, 5);
    }

    #[test]
    fn long_closed_session_is_doublage() {
        let punches = [ts("2025-03-04 07:00:00"), ts("2025-03-04 21:30:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Matin, "Salle", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.shift, Shift::Doublage);
    }

    #[test]
    fn open_session_late_evening_is_doublage() {
        let punches = [ts("2025-03-04 08:00:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Matin, "Salle", &punches, ts("2025-03-04 19:00:00")),
        );
        assert_eq!(v.shift, Shift::Doublage);
        assert!(!v.absent);
    }

    #[test]
    fn punches_on_repos_day_classify_as_worked() {
        let punches = [ts("2025-03-04 07:05:00"), ts("2025-03-04 15:00:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Repos, "Salle", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.shift, Shift::Matin);
        assert!(v.present());
        assert_eq!(v.retard_minutes, 5);
    }

    #[test]
    fn repos_day_without_punches_is_not_absent() {
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Repos, "Salle", &[], ts("2025-03-05 12:00:00")),
        );
        assert!(!v.absent);
        assert_eq!(v.retard_minutes, 0);
        assert_eq!(v.reason, None);
    }

    #[test]
    fn no_show_waits_for_grace_period() {
        let rules = Rules::default();
        let before = classify(&rules, &ctx(Shift::Matin, "Salle", &[], ts("2025-03-04 07:20:00")));
        assert!(!before.absent);
        let after = classify(&rules, &ctx(Shift::Matin, "Salle", &[], ts("2025-03-04 07:31:00")));
        assert!(after.absent);
        assert_eq!(after.reason.as_deref(), Some(REASON_ABSENCE));
    }

    #[test]
    fn missing_exit_beats_lateness_on_closed_day() {
        let punches = [ts("2025-03-04 07:40:00")];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Matin, "Salle", &punches, ts("2025-03-06 09:00:00")),
        );
        assert!(v.absent);
        assert_eq!(v.retard_minutes, 0);
        assert_eq!(v.reason.as_deref(), Some(REASON_MISSING_EXIT));
    }

    #[test]
    fn chef_windows_are_judged_independently() {
        let punches = [
            ts("2025-03-04 11:20:00"),
            ts("2025-03-04 16:00:00"),
            ts("2025-03-04 19:10:00"),
            ts("2025-03-04 22:00:00"),
        ];
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Doublage, "Chef_Cuisine", &punches, ts("2025-03-05 12:00:00")),
        );
        assert_eq!(v.retard_minutes, 30);
        assert!(v.present());
    }

    #[test]
    fn chef_no_show_is_absent_after_grace() {
        let v = classify(
            &Rules::default(),
            &ctx(Shift::Doublage, "Chef_Cuisine", &[], ts("2025-03-04 11:45:00")),
        );
        assert!(v.absent);
    }
}
