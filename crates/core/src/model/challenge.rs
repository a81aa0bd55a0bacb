use chrono::{DateTime, Days, NaiveDate, Utc};
use thiserror::Error;

use crate::model::ids::ChallengeId;

/// Fixed length of a challenge, in days.
pub const CHALLENGE_SPAN_DAYS: u64 = 64;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChallengeError {
    #[error("ultimate focus goal hours must be a non-negative number")]
    InvalidGoalHours,

    #[error("end date is before start date")]
    InvalidDateRange,
}

//
// ─── CHALLENGE ─────────────────────────────────────────────────────────────────
//

/// A 64-day focus commitment. At most one challenge is active at a time;
/// activating a new one deactivates all others.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    id: ChallengeId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    ultimate_focus_goal_hours: f64,
    active: bool,
}

impl Challenge {
    /// Creates a new active challenge spanning exactly 64 days from `start_date`.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::InvalidGoalHours` if the goal is negative or
    /// non-finite.
    pub fn new(
        id: ChallengeId,
        start_date: NaiveDate,
        ultimate_focus_goal_hours: f64,
    ) -> Result<Self, ChallengeError> {
        if !ultimate_focus_goal_hours.is_finite() || ultimate_focus_goal_hours < 0.0 {
            return Err(ChallengeError::InvalidGoalHours);
        }

        Ok(Self {
            id,
            start_date,
            end_date: start_date + Days::new(CHALLENGE_SPAN_DAYS),
            ultimate_focus_goal_hours,
            active: true,
        })
    }

    /// Rehydrate a challenge from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError` if persisted fields fail validation.
    pub fn from_persisted(
        id: ChallengeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        ultimate_focus_goal_hours: f64,
        active: bool,
    ) -> Result<Self, ChallengeError> {
        if !ultimate_focus_goal_hours.is_finite() || ultimate_focus_goal_hours < 0.0 {
            return Err(ChallengeError::InvalidGoalHours);
        }
        if end_date < start_date {
            return Err(ChallengeError::InvalidDateRange);
        }

        Ok(Self {
            id,
            start_date,
            end_date,
            ultimate_focus_goal_hours,
            active,
        })
    }

    /// Whole days left until the end date, bounded at zero.
    #[must_use]
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ChallengeId {
        self.id
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    #[must_use]
    pub fn ultimate_focus_goal_hours(&self) -> f64 {
        self.ultimate_focus_goal_hours
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Per-day progress row of a challenge: focus-minute accumulator plus the
/// last countdown snapshot and the cached daily quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeProgress {
    challenge_id: ChallengeId,
    date: NaiveDate,
    focus_minutes: u32,
    countdown_seconds: i64,
    quote: Option<String>,
    in_active_window: bool,
    updated_at: DateTime<Utc>,
}

impl ChallengeProgress {
    /// Creates a fresh progress row for one challenge day.
    #[must_use]
    pub fn new(
        challenge_id: ChallengeId,
        date: NaiveDate,
        countdown_seconds: i64,
        in_active_window: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            challenge_id,
            date,
            focus_minutes: 0,
            countdown_seconds,
            quote: None,
            in_active_window,
            updated_at: now,
        }
    }

    /// Rehydrate a progress row from persisted storage.
    #[must_use]
    pub fn from_persisted(
        challenge_id: ChallengeId,
        date: NaiveDate,
        focus_minutes: u32,
        countdown_seconds: i64,
        quote: Option<String>,
        in_active_window: bool,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            challenge_id,
            date,
            focus_minutes,
            countdown_seconds,
            quote,
            in_active_window,
            updated_at,
        }
    }

    /// Add focus minutes to the daily accumulator.
    pub fn add_focus_minutes(&mut self, minutes: u32, now: DateTime<Utc>) {
        self.focus_minutes = self.focus_minutes.saturating_add(minutes);
        self.updated_at = now;
    }

    /// Overwrite the countdown snapshot and window flag.
    pub fn set_countdown(&mut self, seconds: i64, in_active_window: bool, now: DateTime<Utc>) {
        self.countdown_seconds = seconds;
        self.in_active_window = in_active_window;
        self.updated_at = now;
    }

    /// Cache the daily quote so repeated reads return the same text.
    pub fn set_quote(&mut self, quote: String, now: DateTime<Utc>) {
        self.quote = Some(quote);
        self.updated_at = now;
    }

    // Accessors
    #[must_use]
    pub fn challenge_id(&self) -> ChallengeId {
        self.challenge_id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    #[must_use]
    pub fn countdown_seconds(&self) -> i64 {
        self.countdown_seconds
    }

    #[must_use]
    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }

    #[must_use]
    pub fn in_active_window(&self) -> bool {
        self.in_active_window
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()
    }

    #[test]
    fn new_spans_exactly_64_days() {
        let challenge = Challenge::new(ChallengeId::new(1), start_date(), 100.0).unwrap();
        assert_eq!(
            challenge.end_date(),
            NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
        );
        assert!(challenge.is_active());
    }

    #[test]
    fn new_rejects_negative_goal_hours() {
        let err = Challenge::new(ChallengeId::new(1), start_date(), -1.0).unwrap_err();
        assert_eq!(err, ChallengeError::InvalidGoalHours);
    }

    #[test]
    fn days_remaining_bounded_at_zero() {
        let challenge = Challenge::new(ChallengeId::new(1), start_date(), 100.0).unwrap();
        assert_eq!(challenge.days_remaining(start_date()), 64);
        assert_eq!(
            challenge.days_remaining(start_date() + Days::new(70)),
            0
        );
    }

    #[test]
    fn from_persisted_rejects_inverted_dates() {
        let err = Challenge::from_persisted(
            ChallengeId::new(1),
            start_date(),
            start_date() - Days::new(1),
            100.0,
            true,
        )
        .unwrap_err();
        assert_eq!(err, ChallengeError::InvalidDateRange);
    }

    #[test]
    fn progress_accumulates_focus_minutes() {
        let mut row = ChallengeProgress::new(ChallengeId::new(1), start_date(), 100, true, fixed_now());
        row.add_focus_minutes(10, fixed_now());
        row.add_focus_minutes(15, fixed_now());
        assert_eq!(row.focus_minutes(), 25);
    }

    #[test]
    fn progress_caches_quote() {
        let mut row = ChallengeProgress::new(ChallengeId::new(1), start_date(), 100, true, fixed_now());
        assert_eq!(row.quote(), None);
        row.set_quote("keep going".to_owned(), fixed_now());
        assert_eq!(row.quote(), Some("keep going"));
    }
}
