use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::activity_service::ActivityService;
use crate::challenge_service::ChallengeService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::session_service::SessionService;
use crate::topic_service::TopicService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    topics: TopicService,
    activities: ActivityService,
    sessions: SessionService,
    challenges: ChallengeService,
    dashboard: DashboardService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock))
    }

    /// Build services over the in-memory repository, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(&Storage::in_memory(), clock)
    }

    /// Wire the full service stack over an existing storage backend.
    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        let topics = TopicService::new(
            clock,
            Arc::clone(&storage.topics),
            Arc::clone(&storage.subtopics),
        );
        let activities = ActivityService::new(
            clock,
            Arc::clone(&storage.activities),
            Arc::clone(&storage.sessions),
        );
        let challenges = ChallengeService::new(
            clock,
            Arc::clone(&storage.challenges),
            Arc::clone(&storage.progress),
        );
        let sessions = SessionService::new(
            clock,
            Arc::clone(&storage.activities),
            Arc::clone(&storage.sessions),
            challenges.clone(),
        );
        let dashboard = DashboardService::new(
            Arc::clone(&storage.settings),
            Arc::clone(&storage.sessions),
            topics.clone(),
            activities.clone(),
        );

        Self {
            topics,
            activities,
            sessions,
            challenges,
            dashboard,
        }
    }

    #[must_use]
    pub fn topics(&self) -> &TopicService {
        &self.topics
    }

    #[must_use]
    pub fn activities(&self) -> &ActivityService {
        &self.activities
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    #[must_use]
    pub fn challenges(&self) -> &ChallengeService {
        &self.challenges
    }

    #[must_use]
    pub fn dashboard(&self) -> &DashboardService {
        &self.dashboard
    }
}
