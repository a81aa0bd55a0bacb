//! Active-window and countdown arithmetic for the 64-day challenge.
//!
//! All functions take local wall-clock time as arguments so they stay pure;
//! services pass in `Clock::now_local()`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::CHALLENGE_SPAN_DAYS;

/// Hour of day the active window opens.
pub const ACTIVE_WINDOW_START_HOUR: u32 = 7;

/// Hour of day the active window closes.
pub const ACTIVE_WINDOW_END_HOUR: u32 = 21;

/// Countdown budget per challenge day, in seconds.
///
/// TODO: confirm with product — the budget is 16 h/day while the
/// 07:00–21:00 window spans 14 h. The original tracker shipped with this
/// mismatch, so it is reproduced rather than corrected here.
pub const DAILY_BUDGET_SECS: i64 = 16 * 3600;

/// Countdown seeded into a brand-new challenge: the full 64-day budget.
pub const INITIAL_COUNTDOWN_SECS: i64 = CHALLENGE_SPAN_DAYS as i64 * DAILY_BUDGET_SECS;

/// True while the local time sits inside the daily active window.
#[must_use]
pub fn in_active_window(now: NaiveDateTime) -> bool {
    (ACTIVE_WINDOW_START_HOUR..ACTIVE_WINDOW_END_HOUR).contains(&now.hour())
}

fn window_open(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(ACTIVE_WINDOW_START_HOUR, 0, 0).expect("valid time"))
}

fn window_close(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(ACTIVE_WINDOW_END_HOUR, 0, 0).expect("valid time"))
}

/// Wall-clock seconds left inside today's active window.
///
/// Before the window opens the whole window remains; after it closes the
/// answer is zero.
#[must_use]
pub fn window_secs_remaining_today(now: NaiveDateTime) -> i64 {
    let open = window_open(now.date());
    let close = window_close(now.date());
    if now >= close {
        0
    } else if now <= open {
        (close - open).num_seconds()
    } else {
        (close - now).num_seconds()
    }
}

/// Remaining countdown seconds for a challenge ending on `end_date`:
/// the rest of today's window plus one daily budget per full day left.
#[must_use]
pub fn countdown_secs(now: NaiveDateTime, end_date: NaiveDate) -> i64 {
    let days_left = (end_date - now.date()).num_days().max(0);
    window_secs_remaining_today(now) + (days_left - 1).max(0) * DAILY_BUDGET_SECS
}

/// Whole minutes until the next local midnight.
#[must_use]
pub fn minutes_until_midnight(now: NaiveDateTime) -> i64 {
    let next_midnight = (now.date() + chrono::Days::new(1)).and_time(NaiveTime::MIN);
    (next_midnight - now).num_minutes()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 11, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn window_flags_inside_and_outside_hours() {
        assert!(!in_active_window(at(6, 59)));
        assert!(in_active_window(at(7, 0)));
        assert!(in_active_window(at(20, 59)));
        assert!(!in_active_window(at(21, 0)));
        assert!(!in_active_window(at(23, 30)));
    }

    #[test]
    fn remaining_today_before_window_is_full_window() {
        assert_eq!(window_secs_remaining_today(at(5, 0)), 14 * 3600);
    }

    #[test]
    fn remaining_today_mid_window_counts_to_close() {
        // 12:00 -> 9 hours until 21:00
        assert_eq!(window_secs_remaining_today(at(12, 0)), 9 * 3600);
    }

    #[test]
    fn remaining_today_after_close_is_zero() {
        assert_eq!(window_secs_remaining_today(at(22, 0)), 0);
    }

    #[test]
    fn countdown_adds_daily_budget_per_remaining_day() {
        let end = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap() + Days::new(10);
        // 9h left today + 9 further days at the 16h budget
        assert_eq!(
            countdown_secs(at(12, 0), end),
            9 * 3600 + 9 * DAILY_BUDGET_SECS
        );
    }

    #[test]
    fn countdown_on_final_day_is_window_remainder() {
        let end = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        assert_eq!(countdown_secs(at(12, 0), end), 9 * 3600);
    }

    #[test]
    fn countdown_past_end_date_only_counts_today() {
        let end = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
        assert_eq!(countdown_secs(at(22, 0), end), 0);
    }

    #[test]
    fn initial_countdown_is_full_span_budget() {
        assert_eq!(INITIAL_COUNTDOWN_SECS, 64 * 16 * 3600);
    }

    #[test]
    fn midnight_countdown_in_minutes() {
        assert_eq!(minutes_until_midnight(at(23, 30)), 30);
        assert_eq!(minutes_until_midnight(at(0, 0)), 24 * 60);
    }
}
