use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ActivityId, SessionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("session is not active")]
    NotActive,

    #[error("ended_at is before started_at")]
    InvalidTimeRange,

    #[error("unknown session kind: {0}")]
    UnknownKind(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// How a session was started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionKind {
    #[default]
    Manual,
    Timer,
}

impl SessionKind {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Manual => "manual",
            SessionKind::Timer => "timer",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = SessionStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(SessionKind::Manual),
            "timer" => Ok(SessionKind::Timer),
            other => Err(SessionStateError::UnknownKind(other.to_owned())),
        }
    }
}

//
// ─── ELAPSED ───────────────────────────────────────────────────────────────────
//

/// Elapsed time of a running session, in the units the timer view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed (or manually tracked) stretch of work on an activity.
///
/// At most one session per activity is active at a time; the storage layer
/// backs this invariant with a unique index over active rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySession {
    id: SessionId,
    activity_id: ActivityId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_minutes: Option<u32>,
    active: bool,
    kind: SessionKind,
}

impl ActivitySession {
    /// Start a new active session.
    #[must_use]
    pub fn start(
        id: SessionId,
        activity_id: ActivityId,
        kind: SessionKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            activity_id,
            started_at: now,
            ended_at: None,
            duration_minutes: None,
            active: true,
            kind,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTimeRange` if `ended_at` precedes
    /// `started_at`.
    pub fn from_persisted(
        id: SessionId,
        activity_id: ActivityId,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        duration_minutes: Option<u32>,
        active: bool,
        kind: SessionKind,
    ) -> Result<Self, SessionStateError> {
        if let Some(ended) = ended_at {
            if ended < started_at {
                return Err(SessionStateError::InvalidTimeRange);
            }
        }

        Ok(Self {
            id,
            activity_id,
            started_at,
            ended_at,
            duration_minutes,
            active,
            kind,
        })
    }

    /// End the session, computing whole elapsed minutes (clamped at zero).
    ///
    /// Returns the computed duration in minutes.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotActive` if the session already ended.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<u32, SessionStateError> {
        if !self.active {
            return Err(SessionStateError::NotActive);
        }

        let millis = (now - self.started_at).num_milliseconds().max(0);
        let minutes = u32::try_from(millis / 60_000).unwrap_or(u32::MAX);

        self.ended_at = Some(now);
        self.duration_minutes = Some(minutes);
        self.active = false;
        Ok(minutes)
    }

    /// Elapsed time since the session started.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Elapsed {
        let millis = (now - self.started_at).num_milliseconds().max(0);
        Elapsed {
            minutes: millis / 60_000,
            seconds: millis / 1_000,
            milliseconds: millis,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn activity_id(&self) -> ActivityId {
        self.activity_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn started() -> ActivitySession {
        ActivitySession::start(
            SessionId::new(1),
            ActivityId::new(1),
            SessionKind::Manual,
            fixed_now(),
        )
    }

    #[test]
    fn start_is_active_without_end() {
        let session = started();
        assert!(session.is_active());
        assert_eq!(session.ended_at(), None);
        assert_eq!(session.duration_minutes(), None);
    }

    #[test]
    fn end_floors_duration_to_whole_minutes() {
        let mut session = started();
        let minutes = session.end(fixed_now() + Duration::seconds(125)).unwrap();
        assert_eq!(minutes, 2);
        assert_eq!(session.duration_minutes(), Some(2));
        assert!(!session.is_active());
    }

    #[test]
    fn end_clamps_negative_duration_at_zero() {
        let mut session = started();
        let minutes = session.end(fixed_now() - Duration::seconds(30)).unwrap();
        assert_eq!(minutes, 0);
    }

    #[test]
    fn end_twice_fails() {
        let mut session = started();
        session.end(fixed_now() + Duration::minutes(1)).unwrap();
        let err = session.end(fixed_now() + Duration::minutes(2)).unwrap_err();
        assert_eq!(err, SessionStateError::NotActive);
    }

    #[test]
    fn elapsed_reports_all_units() {
        let session = started();
        let elapsed = session.elapsed(fixed_now() + Duration::seconds(125));
        assert_eq!(elapsed.minutes, 2);
        assert_eq!(elapsed.seconds, 125);
        assert_eq!(elapsed.milliseconds, 125_000);
    }

    #[test]
    fn from_persisted_rejects_inverted_range() {
        let err = ActivitySession::from_persisted(
            SessionId::new(1),
            ActivityId::new(1),
            fixed_now(),
            Some(fixed_now() - Duration::minutes(1)),
            Some(0),
            false,
            SessionKind::Timer,
        )
        .unwrap_err();
        assert_eq!(err, SessionStateError::InvalidTimeRange);
    }

    #[test]
    fn kind_round_trips_through_storage_form() {
        for kind in [SessionKind::Manual, SessionKind::Timer] {
            assert_eq!(kind.as_str().parse::<SessionKind>().unwrap(), kind);
        }
        assert!("pomodoro".parse::<SessionKind>().is_err());
    }
}
