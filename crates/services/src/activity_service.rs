use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use momentum_core::calc::{self, PeriodProgress};
use momentum_core::countdown;
use momentum_core::model::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, Elapsed, SessionId,
};
use storage::repository::{
    ActivityRepository, NewActivityRecord, SessionRepository, StorageError,
};

use crate::Clock;
use crate::error::ActivityServiceError;

/// Per-period progress of one activity, plus the minutes left before local
/// midnight resets the daily window.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityProgress {
    pub activity: Activity,
    pub daily: PeriodProgress,
    pub weekly: PeriodProgress,
    pub monthly: PeriodProgress,
    pub yearly: PeriodProgress,
    pub minutes_until_midnight: i64,
}

/// Elapsed-time snapshot of an activity's running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStatus {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub elapsed: Elapsed,
}

/// Orchestrates activity CRUD and counter movements.
#[derive(Clone)]
pub struct ActivityService {
    clock: Clock,
    activities: Arc<dyn ActivityRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn new(
        clock: Clock,
        activities: Arc<dyn ActivityRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            activities,
            sessions,
        }
    }

    /// Create a new activity with zero reps. Goals default to all-zero.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Activity` for validation failures,
    /// `ActivityServiceError::NameTaken` if the name is already in use.
    pub async fn create(&self, draft: ActivityDraft) -> Result<Activity, ActivityServiceError> {
        let now = self.clock.now();
        let activity = Activity::new(ActivityId::new(0), draft, now)?;
        let id = match self
            .activities
            .insert_activity(NewActivityRecord::from_activity(&activity))
            .await
        {
            Ok(id) => id,
            Err(StorageError::Conflict) => return Err(ActivityServiceError::NameTaken),
            Err(e) => return Err(e.into()),
        };
        self.get(id).await
    }

    /// Fetch an activity by id.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn get(&self, id: ActivityId) -> Result<Activity, ActivityServiceError> {
        Ok(self
            .activities
            .get_activity(id)
            .await?
            .ok_or(StorageError::NotFound)?)
    }

    /// List all activities ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` if repository access fails.
    pub async fn list(&self) -> Result<Vec<Activity>, ActivityServiceError> {
        Ok(self.activities.list_activities().await?)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Activity` for validation failures,
    /// `ActivityServiceError::NameTaken` on a name collision,
    /// `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn update(
        &self,
        id: ActivityId,
        patch: ActivityPatch,
    ) -> Result<Activity, ActivityServiceError> {
        let mut activity = self.get(id).await?;
        activity.apply(patch, self.clock.now())?;
        match self.activities.update_activity(&activity).await {
            Ok(()) => Ok(activity),
            Err(StorageError::Conflict) => Err(ActivityServiceError::NameTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an activity. Its sessions go with it.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn delete(&self, id: ActivityId) -> Result<(), ActivityServiceError> {
        self.activities.delete_activity(id).await?;
        Ok(())
    }

    /// Increase the rep counter. No ceiling.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn increment(
        &self,
        id: ActivityId,
        amount: u32,
    ) -> Result<Activity, ActivityServiceError> {
        let mut activity = self.get(id).await?;
        activity.increment(amount, self.clock.now());
        self.activities.update_activity(&activity).await?;
        Ok(activity)
    }

    /// Decrease the rep counter; the result never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn decrement(
        &self,
        id: ActivityId,
        amount: u32,
    ) -> Result<Activity, ActivityServiceError> {
        let mut activity = self.get(id).await?;
        activity.decrement(amount, self.clock.now());
        self.activities.update_activity(&activity).await?;
        Ok(activity)
    }

    /// Progress of the current rep count against each period's target.
    ///
    /// The same counter is compared against every period; only the targets
    /// differ.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if missing.
    pub async fn progress(&self, id: ActivityId) -> Result<ActivityProgress, ActivityServiceError> {
        let activity = self.get(id).await?;
        let reps = activity.reps();
        let goals = activity.goals();
        let minutes_until_midnight = countdown::minutes_until_midnight(self.clock.now_local());

        Ok(ActivityProgress {
            daily: calc::period_progress(reps, goals.daily),
            weekly: calc::period_progress(reps, goals.weekly),
            monthly: calc::period_progress(reps, goals.monthly),
            yearly: calc::period_progress(reps, goals.yearly),
            minutes_until_midnight,
            activity,
        })
    }

    /// Elapsed time of the activity's active session.
    ///
    /// Returns `Ok(None)` when no session is running; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` with `NotFound` if the
    /// activity itself is missing.
    pub async fn timer_status(
        &self,
        id: ActivityId,
    ) -> Result<Option<TimerStatus>, ActivityServiceError> {
        self.get(id).await?;
        let Some(session) = self.sessions.active_session(id).await? else {
            return Ok(None);
        };
        Ok(Some(TimerStatus {
            session_id: session.id(),
            started_at: session.started_at(),
            elapsed: session.elapsed(self.clock.now()),
        }))
    }
}
