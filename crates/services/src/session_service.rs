use std::sync::Arc;

use tracing::warn;

use momentum_core::model::{
    ActivityId, ActivitySession, SessionId, SessionKind,
};
use storage::repository::{
    ActivityRepository, NewSessionRecord, SessionRepository, StorageError,
};

use crate::Clock;
use crate::challenge_service::ChallengeService;
use crate::error::SessionServiceError;

/// Result of ending a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnded {
    pub session: ActivitySession,
    pub duration_minutes: u32,
}

/// Session lifecycle: start, end, and the time-based side effects of ending.
///
/// Starting enforces the one-active-session-per-activity invariant twice:
/// a read check for a clean conflict error, and the storage-level unique
/// index for the race two concurrent starts would otherwise win together.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    activities: Arc<dyn ActivityRepository>,
    sessions: Arc<dyn SessionRepository>,
    challenges: ChallengeService,
}

impl SessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        activities: Arc<dyn ActivityRepository>,
        sessions: Arc<dyn SessionRepository>,
        challenges: ChallengeService,
    ) -> Self {
        Self {
            clock,
            activities,
            sessions,
            challenges,
        }
    }

    /// Start a session for an activity.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::ActiveSessionExists` if the activity
    /// already has an active session (whatever kind was requested),
    /// `SessionServiceError::Storage` with `NotFound` if the activity is
    /// missing.
    pub async fn start(
        &self,
        activity_id: ActivityId,
        kind: SessionKind,
    ) -> Result<ActivitySession, SessionServiceError> {
        self.activities
            .get_activity(activity_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        if self.sessions.active_session(activity_id).await?.is_some() {
            return Err(SessionServiceError::ActiveSessionExists);
        }

        let session = ActivitySession::start(SessionId::new(0), activity_id, kind, self.clock.now());
        let id = match self
            .sessions
            .insert_session(NewSessionRecord::from_session(&session))
            .await
        {
            Ok(id) => id,
            // Lost the race against a concurrent start: the unique index
            // rejected the second active row.
            Err(StorageError::Conflict) => {
                return Err(SessionServiceError::ActiveSessionExists);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(self
            .sessions
            .get_session(id)
            .await?
            .ok_or(StorageError::NotFound)?)
    }

    /// End a session, computing its duration in whole minutes.
    ///
    /// For a time-based activity with a non-zero duration, the duration is
    /// credited to the activity's rep counter and fed into the challenge's
    /// daily focus accumulator. Those side effects are logged on failure but
    /// never fail the end itself.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` with `NotFound` if the session
    /// does not exist or belongs to another activity,
    /// `SessionServiceError::Session` if it already ended.
    pub async fn end(
        &self,
        activity_id: ActivityId,
        session_id: SessionId,
    ) -> Result<SessionEnded, SessionServiceError> {
        let mut session = self
            .sessions
            .get_session(session_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        if session.activity_id() != activity_id {
            return Err(StorageError::NotFound.into());
        }

        let duration_minutes = session.end(self.clock.now())?;
        self.sessions.update_session(&session).await?;

        if duration_minutes > 0 {
            self.credit_time_based_activity(activity_id, duration_minutes)
                .await;
        }

        Ok(SessionEnded {
            session,
            duration_minutes,
        })
    }

    /// All sessions of an activity, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` with `NotFound` if the activity
    /// is missing.
    pub async fn list(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivitySession>, SessionServiceError> {
        self.activities
            .get_activity(activity_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(self.sessions.sessions_for_activity(activity_id).await?)
    }

    /// Non-fatal side effects of ending a time-based session: bump the
    /// activity's reps by the duration and accumulate challenge focus
    /// minutes. Failures are logged and swallowed.
    async fn credit_time_based_activity(&self, activity_id: ActivityId, duration_minutes: u32) {
        let activity = match self.activities.get_activity(activity_id).await {
            Ok(Some(activity)) => activity,
            Ok(None) => return,
            Err(e) => {
                warn!(activity_id = %activity_id, error = %e, "failed to load activity after session end");
                return;
            }
        };
        if !activity.time_based() {
            return;
        }

        let mut activity = activity;
        activity.increment(duration_minutes, self.clock.now());
        if let Err(e) = self.activities.update_activity(&activity).await {
            warn!(
                activity_id = %activity_id,
                minutes = duration_minutes,
                error = %e,
                "failed to credit session minutes to activity reps"
            );
        }

        if let Err(e) = self.challenges.record_focus_minutes(duration_minutes).await {
            warn!(
                minutes = duration_minutes,
                error = %e,
                "failed to record focus minutes on challenge"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, Utc};
    use momentum_core::model::ActivityDraft;
    use momentum_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewActivityRecord};

    async fn setup(now: DateTime<Utc>, time_based: bool) -> (SessionService, ActivityId) {
        let repo = InMemoryRepository::new();
        let clock = Clock::Fixed(now);
        let challenges =
            ChallengeService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()));
        let service = SessionService::new(
            clock,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            challenges,
        );

        let activity = momentum_core::model::Activity::new(
            ActivityId::new(0),
            ActivityDraft {
                name: "Deep Work".to_owned(),
                time_based,
                ..ActivityDraft::default()
            },
            now,
        )
        .unwrap();
        let id = repo
            .insert_activity(NewActivityRecord::from_activity(&activity))
            .await
            .unwrap();
        (service, id)
    }

    fn midday() -> DateTime<Utc> {
        fixed_now()
            .date_naive()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[tokio::test]
    async fn start_conflicts_when_already_active() {
        let (service, activity_id) = setup(midday(), false).await;
        service.start(activity_id, SessionKind::Manual).await.unwrap();

        // Kind does not matter: the activity is busy.
        let err = service
            .start(activity_id, SessionKind::Timer)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionServiceError::ActiveSessionExists));
    }

    #[tokio::test]
    async fn start_unknown_activity_is_not_found() {
        let (service, _) = setup(midday(), false).await;
        let err = service
            .start(ActivityId::new(404), SessionKind::Manual)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionServiceError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn end_computes_floored_minutes() {
        let (service, activity_id) = setup(midday(), false).await;
        let session = service.start(activity_id, SessionKind::Timer).await.unwrap();

        let mut later = service.clone();
        later.clock = Clock::Fixed(midday() + Duration::seconds(125));
        let ended = later.end(activity_id, session.id()).await.unwrap();

        assert_eq!(ended.duration_minutes, 2);
        assert!(!ended.session.is_active());
        assert_eq!(ended.session.duration_minutes(), Some(2));
    }

    #[tokio::test]
    async fn end_twice_fails() {
        let (service, activity_id) = setup(midday(), false).await;
        let session = service.start(activity_id, SessionKind::Manual).await.unwrap();
        service.end(activity_id, session.id()).await.unwrap();

        let err = service.end(activity_id, session.id()).await.unwrap_err();
        assert!(matches!(err, SessionServiceError::Session(_)));
    }

    #[tokio::test]
    async fn end_wrong_activity_is_not_found() {
        let (service, activity_id) = setup(midday(), false).await;
        let session = service.start(activity_id, SessionKind::Manual).await.unwrap();

        let err = service
            .end(ActivityId::new(999), session.id())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionServiceError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn time_based_end_credits_reps_and_challenge() {
        let (service, activity_id) = setup(midday(), true).await;
        service.challenges.create(100.0).await.unwrap();

        let session = service.start(activity_id, SessionKind::Timer).await.unwrap();
        let mut later = service.clone();
        later.clock = Clock::Fixed(midday() + Duration::minutes(10));
        later.end(activity_id, session.id()).await.unwrap();

        let activity = later
            .activities
            .get_activity(activity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(activity.reps(), 10);

        let stats = later.challenges.stats().await.unwrap();
        assert_eq!(stats.total_focus_minutes, 10);
    }

    #[tokio::test]
    async fn time_based_end_without_challenge_still_succeeds() {
        let (service, activity_id) = setup(midday(), true).await;
        let session = service.start(activity_id, SessionKind::Timer).await.unwrap();

        let mut later = service.clone();
        later.clock = Clock::Fixed(midday() + Duration::minutes(10));
        let ended = later.end(activity_id, session.id()).await.unwrap();
        assert_eq!(ended.duration_minutes, 10);

        // Reps still increment even though no challenge is active.
        let activity = later
            .activities
            .get_activity(activity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(activity.reps(), 10);
    }

    #[tokio::test]
    async fn plain_activity_end_leaves_reps_alone() {
        let (service, activity_id) = setup(midday(), false).await;
        let session = service.start(activity_id, SessionKind::Timer).await.unwrap();

        let mut later = service.clone();
        later.clock = Clock::Fixed(midday() + Duration::minutes(10));
        later.end(activity_id, session.id()).await.unwrap();

        let activity = later
            .activities
            .get_activity(activity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(activity.reps(), 0);
    }

    #[tokio::test]
    async fn start_again_after_end() {
        let (service, activity_id) = setup(midday(), false).await;
        let session = service.start(activity_id, SessionKind::Manual).await.unwrap();
        service.end(activity_id, session.id()).await.unwrap();

        service.start(activity_id, SessionKind::Manual).await.unwrap();
        let sessions = service.list(activity_id).await.unwrap();
        assert_eq!(sessions.len(), 2);
    }
}
