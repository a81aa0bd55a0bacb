use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use momentum_core::model::{
    Activity, ActivityId, ActivitySession, Challenge, ChallengeId, ChallengeProgress, Goals,
    SessionId, SessionKind, Subtopic, SubtopicId, Topic, TopicId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── INSERT RECORDS ────────────────────────────────────────────────────────────
//

/// Insert shape for a topic; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTopicRecord {
    pub title: String,
    pub category: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub money_per_5_reps: f64,
    pub rate_locked: bool,
    pub earnings: f64,
    pub completion_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTopicRecord {
    #[must_use]
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            title: topic.title().to_owned(),
            category: topic.category().to_owned(),
            notes: topic.notes().map(str::to_owned),
            urls: topic.urls().to_vec(),
            money_per_5_reps: topic.money_per_5_reps(),
            rate_locked: topic.rate_locked(),
            earnings: topic.earnings(),
            completion_percentage: topic.completion_percentage(),
            created_at: topic.created_at(),
            updated_at: topic.updated_at(),
        }
    }
}

/// Insert shape for a subtopic; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSubtopicRecord {
    pub topic_id: TopicId,
    pub title: String,
    pub notes: Option<String>,
    pub urls: Vec<String>,
    pub reps_completed: u32,
    pub reps_goal: u32,
    pub goal_amount: f64,
}

impl NewSubtopicRecord {
    #[must_use]
    pub fn from_subtopic(subtopic: &Subtopic) -> Self {
        Self {
            topic_id: subtopic.topic_id(),
            title: subtopic.title().to_owned(),
            notes: subtopic.notes().map(str::to_owned),
            urls: subtopic.urls().to_vec(),
            reps_completed: subtopic.reps_completed(),
            reps_goal: subtopic.reps_goal(),
            goal_amount: subtopic.goal_amount(),
        }
    }
}

/// Insert shape for an activity; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewActivityRecord {
    pub name: String,
    pub reps: u32,
    pub goals: Goals,
    pub time_based: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewActivityRecord {
    #[must_use]
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            name: activity.name().to_owned(),
            reps: activity.reps(),
            goals: activity.goals(),
            time_based: activity.time_based(),
            created_at: activity.created_at(),
            updated_at: activity.updated_at(),
        }
    }
}

/// Insert shape for a session; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub activity_id: ActivityId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub active: bool,
    pub kind: SessionKind,
}

impl NewSessionRecord {
    #[must_use]
    pub fn from_session(session: &ActivitySession) -> Self {
        Self {
            activity_id: session.activity_id(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            duration_minutes: session.duration_minutes(),
            active: session.is_active(),
            kind: session.kind(),
        }
    }
}

/// Insert shape for a challenge; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewChallengeRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ultimate_focus_goal_hours: f64,
    pub active: bool,
}

impl NewChallengeRecord {
    #[must_use]
    pub fn from_challenge(challenge: &Challenge) -> Self {
        Self {
            start_date: challenge.start_date(),
            end_date: challenge.end_date(),
            ultimate_focus_goal_hours: challenge.ultimate_focus_goal_hours(),
            active: challenge.is_active(),
        }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Persist a new topic and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<TopicId, StorageError>;

    /// Fetch a topic by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError>;

    /// List all topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Persist updated fields of an existing topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic does not exist.
    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Delete a topic (and, by ownership, its subtopics).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic does not exist.
    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SubtopicRepository: Send + Sync {
    /// Persist a new subtopic and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subtopic cannot be stored.
    async fn insert_subtopic(&self, subtopic: NewSubtopicRecord)
    -> Result<SubtopicId, StorageError>;

    /// Fetch a subtopic by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_subtopic(&self, id: SubtopicId) -> Result<Option<Subtopic>, StorageError>;

    /// All subtopics belonging to a topic, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn subtopics_for_topic(&self, topic_id: TopicId) -> Result<Vec<Subtopic>, StorageError>;

    /// Persist updated fields of an existing subtopic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subtopic does not exist.
    async fn update_subtopic(&self, subtopic: &Subtopic) -> Result<(), StorageError>;

    /// Delete a subtopic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subtopic does not exist.
    async fn delete_subtopic(&self, id: SubtopicId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch a numeric setting by key. `Ok(None)` when unset.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_setting(&self, key: &str) -> Result<Option<f64>, StorageError>;

    /// Insert or overwrite a numeric setting. Settings are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn upsert_setting(&self, key: &str, value: f64) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persist a new activity and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the name is already taken.
    async fn insert_activity(&self, activity: NewActivityRecord)
    -> Result<ActivityId, StorageError>;

    /// Fetch an activity by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>, StorageError>;

    /// List all activities ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_activities(&self) -> Result<Vec<Activity>, StorageError>;

    /// Persist updated fields of an existing activity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, `StorageError::Conflict`
    /// if the new name collides with another activity.
    async fn update_activity(&self, activity: &Activity) -> Result<(), StorageError>;

    /// Delete an activity (and, by ownership, its sessions).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the activity does not exist.
    async fn delete_activity(&self, id: ActivityId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the record is active and the
    /// activity already has an active session.
    async fn insert_session(&self, session: NewSessionRecord) -> Result<SessionId, StorageError>;

    /// Fetch a session by id. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_session(&self, id: SessionId) -> Result<Option<ActivitySession>, StorageError>;

    /// The activity's currently active session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn active_session(
        &self,
        activity_id: ActivityId,
    ) -> Result<Option<ActivitySession>, StorageError>;

    /// All sessions of an activity, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn sessions_for_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivitySession>, StorageError>;

    /// Persist updated fields of an existing session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn update_session(&self, session: &ActivitySession) -> Result<(), StorageError>;

    /// Number of active sessions across all activities.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn count_active_sessions(&self) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Persist a new challenge and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the challenge cannot be stored.
    async fn insert_challenge(
        &self,
        challenge: NewChallengeRecord,
    ) -> Result<ChallengeId, StorageError>;

    /// The currently active challenge, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn active_challenge(&self) -> Result<Option<Challenge>, StorageError>;

    /// Clear the active flag on every challenge.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn deactivate_all(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress row for one challenge day. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_progress(
        &self,
        challenge_id: ChallengeId,
        date: NaiveDate,
    ) -> Result<Option<ChallengeProgress>, StorageError>;

    /// Insert or overwrite the progress row for its (challenge, date) key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn upsert_progress(&self, progress: &ChallengeProgress) -> Result<(), StorageError>;

    /// All progress rows of a challenge, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn progress_for_challenge(
        &self,
        challenge_id: ChallengeId,
    ) -> Result<Vec<ChallengeProgress>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct Tables {
    topics: HashMap<TopicId, Topic>,
    subtopics: HashMap<SubtopicId, Subtopic>,
    settings: HashMap<String, f64>,
    activities: HashMap<ActivityId, Activity>,
    sessions: HashMap<SessionId, ActivitySession>,
    challenges: HashMap<ChallengeId, Challenge>,
    progress: HashMap<(ChallengeId, NaiveDate), ChallengeProgress>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<TopicId, StorageError> {
        let mut tables = self.lock()?;
        let id = TopicId::new(tables.next_id());
        let stored = Topic::from_persisted(
            id,
            topic.title,
            topic.category,
            topic.notes,
            topic.urls,
            topic.money_per_5_reps,
            topic.rate_locked,
            topic.earnings,
            topic.completion_percentage,
            topic.created_at,
            topic.updated_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.topics.insert(id, stored);
        Ok(id)
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        Ok(self.lock()?.topics.get(&id).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let tables = self.lock()?;
        let mut topics: Vec<Topic> = tables.topics.values().cloned().collect();
        topics.sort_by_key(Topic::id);
        Ok(topics)
    }

    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if !tables.topics.contains_key(&topic.id()) {
            return Err(StorageError::NotFound);
        }
        tables.topics.insert(topic.id(), topic.clone());
        Ok(())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if tables.topics.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        tables.subtopics.retain(|_, sub| sub.topic_id() != id);
        Ok(())
    }
}

#[async_trait]
impl SubtopicRepository for InMemoryRepository {
    async fn insert_subtopic(
        &self,
        subtopic: NewSubtopicRecord,
    ) -> Result<SubtopicId, StorageError> {
        let mut tables = self.lock()?;
        let id = SubtopicId::new(tables.next_id());
        let stored = Subtopic::from_persisted(
            id,
            subtopic.topic_id,
            subtopic.title,
            subtopic.notes,
            subtopic.urls,
            subtopic.reps_completed,
            subtopic.goal_amount,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.subtopics.insert(id, stored);
        Ok(id)
    }

    async fn get_subtopic(&self, id: SubtopicId) -> Result<Option<Subtopic>, StorageError> {
        Ok(self.lock()?.subtopics.get(&id).cloned())
    }

    async fn subtopics_for_topic(&self, topic_id: TopicId) -> Result<Vec<Subtopic>, StorageError> {
        let tables = self.lock()?;
        let mut subtopics: Vec<Subtopic> = tables
            .subtopics
            .values()
            .filter(|sub| sub.topic_id() == topic_id)
            .cloned()
            .collect();
        subtopics.sort_by_key(Subtopic::id);
        Ok(subtopics)
    }

    async fn update_subtopic(&self, subtopic: &Subtopic) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if !tables.subtopics.contains_key(&subtopic.id()) {
            return Err(StorageError::NotFound);
        }
        tables.subtopics.insert(subtopic.id(), subtopic.clone());
        Ok(())
    }

    async fn delete_subtopic(&self, id: SubtopicId) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if tables.subtopics.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<f64>, StorageError> {
        Ok(self.lock()?.settings.get(key).copied())
    }

    async fn upsert_setting(&self, key: &str, value: f64) -> Result<(), StorageError> {
        self.lock()?.settings.insert(key.to_owned(), value);
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryRepository {
    async fn insert_activity(
        &self,
        activity: NewActivityRecord,
    ) -> Result<ActivityId, StorageError> {
        let mut tables = self.lock()?;
        if tables.activities.values().any(|a| a.name() == activity.name) {
            return Err(StorageError::Conflict);
        }
        let id = ActivityId::new(tables.next_id());
        let stored = Activity::from_persisted(
            id,
            activity.name,
            activity.reps,
            activity.goals,
            activity.time_based,
            activity.created_at,
            activity.updated_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.activities.insert(id, stored);
        Ok(id)
    }

    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>, StorageError> {
        Ok(self.lock()?.activities.get(&id).cloned())
    }

    async fn list_activities(&self) -> Result<Vec<Activity>, StorageError> {
        let tables = self.lock()?;
        let mut activities: Vec<Activity> = tables.activities.values().cloned().collect();
        activities.sort_by_key(Activity::id);
        Ok(activities)
    }

    async fn update_activity(&self, activity: &Activity) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if !tables.activities.contains_key(&activity.id()) {
            return Err(StorageError::NotFound);
        }
        if tables
            .activities
            .values()
            .any(|a| a.id() != activity.id() && a.name() == activity.name())
        {
            return Err(StorageError::Conflict);
        }
        tables.activities.insert(activity.id(), activity.clone());
        Ok(())
    }

    async fn delete_activity(&self, id: ActivityId) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if tables.activities.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        tables.sessions.retain(|_, s| s.activity_id() != id);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: NewSessionRecord) -> Result<SessionId, StorageError> {
        let mut tables = self.lock()?;
        if session.active
            && tables
                .sessions
                .values()
                .any(|s| s.activity_id() == session.activity_id && s.is_active())
        {
            return Err(StorageError::Conflict);
        }
        let id = SessionId::new(tables.next_id());
        let stored = ActivitySession::from_persisted(
            id,
            session.activity_id,
            session.started_at,
            session.ended_at,
            session.duration_minutes,
            session.active,
            session.kind,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.sessions.insert(id, stored);
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ActivitySession>, StorageError> {
        Ok(self.lock()?.sessions.get(&id).cloned())
    }

    async fn active_session(
        &self,
        activity_id: ActivityId,
    ) -> Result<Option<ActivitySession>, StorageError> {
        let tables = self.lock()?;
        Ok(tables
            .sessions
            .values()
            .find(|s| s.activity_id() == activity_id && s.is_active())
            .cloned())
    }

    async fn sessions_for_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivitySession>, StorageError> {
        let tables = self.lock()?;
        let mut sessions: Vec<ActivitySession> = tables
            .sessions
            .values()
            .filter(|s| s.activity_id() == activity_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse(s.started_at()));
        Ok(sessions)
    }

    async fn update_session(&self, session: &ActivitySession) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        if !tables.sessions.contains_key(&session.id()) {
            return Err(StorageError::NotFound);
        }
        tables.sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn count_active_sessions(&self) -> Result<u64, StorageError> {
        let tables = self.lock()?;
        Ok(tables.sessions.values().filter(|s| s.is_active()).count() as u64)
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryRepository {
    async fn insert_challenge(
        &self,
        challenge: NewChallengeRecord,
    ) -> Result<ChallengeId, StorageError> {
        let mut tables = self.lock()?;
        let id = ChallengeId::new(tables.next_id());
        let stored = Challenge::from_persisted(
            id,
            challenge.start_date,
            challenge.end_date,
            challenge.ultimate_focus_goal_hours,
            challenge.active,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tables.challenges.insert(id, stored);
        Ok(id)
    }

    async fn active_challenge(&self) -> Result<Option<Challenge>, StorageError> {
        let tables = self.lock()?;
        Ok(tables
            .challenges
            .values()
            .find(|c| c.is_active())
            .cloned())
    }

    async fn deactivate_all(&self) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        let deactivated: Vec<Challenge> = tables
            .challenges
            .values()
            .map(|c| {
                Challenge::from_persisted(
                    c.id(),
                    c.start_date(),
                    c.end_date(),
                    c.ultimate_focus_goal_hours(),
                    false,
                )
            })
            .collect::<Result<_, _>>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        for challenge in deactivated {
            tables.challenges.insert(challenge.id(), challenge);
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        challenge_id: ChallengeId,
        date: NaiveDate,
    ) -> Result<Option<ChallengeProgress>, StorageError> {
        Ok(self.lock()?.progress.get(&(challenge_id, date)).cloned())
    }

    async fn upsert_progress(&self, progress: &ChallengeProgress) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        tables
            .progress
            .insert((progress.challenge_id(), progress.date()), progress.clone());
        Ok(())
    }

    async fn progress_for_challenge(
        &self,
        challenge_id: ChallengeId,
    ) -> Result<Vec<ChallengeProgress>, StorageError> {
        let tables = self.lock()?;
        let mut rows: Vec<ChallengeProgress> = tables
            .progress
            .values()
            .filter(|p| p.challenge_id() == challenge_id)
            .cloned()
            .collect();
        rows.sort_by_key(ChallengeProgress::date);
        Ok(rows)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates all repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub subtopics: Arc<dyn SubtopicRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub challenges: Arc<dyn ChallengeRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            topics: Arc::new(repo.clone()),
            subtopics: Arc::new(repo.clone()),
            settings: Arc::new(repo.clone()),
            activities: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            challenges: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::model::{ActivityDraft, SubtopicDraft, TopicDraft};
    use momentum_core::time::fixed_now;

    fn topic_record(title: &str) -> NewTopicRecord {
        let topic = Topic::new(
            TopicId::new(0),
            TopicDraft {
                title: title.to_owned(),
                category: "Fitness".to_owned(),
                ..TopicDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        NewTopicRecord::from_topic(&topic)
    }

    fn activity_record(name: &str) -> NewActivityRecord {
        let activity = Activity::new(
            ActivityId::new(0),
            ActivityDraft {
                name: name.to_owned(),
                ..ActivityDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        NewActivityRecord::from_activity(&activity)
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let repo = InMemoryRepository::new();
        let a = repo.insert_topic(topic_record("Pushups")).await.unwrap();
        let b = repo.insert_topic(topic_record("Squats")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_topic_removes_its_subtopics() {
        let repo = InMemoryRepository::new();
        let topic_id = repo.insert_topic(topic_record("Pushups")).await.unwrap();
        let sub = Subtopic::new(
            SubtopicId::new(0),
            topic_id,
            SubtopicDraft {
                title: "Set A".to_owned(),
                goal_amount: 1000.0,
                ..SubtopicDraft::default()
            },
        )
        .unwrap();
        repo.insert_subtopic(NewSubtopicRecord::from_subtopic(&sub))
            .await
            .unwrap();

        repo.delete_topic(topic_id).await.unwrap();
        assert!(repo.subtopics_for_topic(topic_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_activity_name_conflicts() {
        let repo = InMemoryRepository::new();
        repo.insert_activity(activity_record("Reading")).await.unwrap();
        let err = repo
            .insert_activity(activity_record("Reading"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn second_active_session_conflicts() {
        let repo = InMemoryRepository::new();
        let activity_id = repo.insert_activity(activity_record("Reading")).await.unwrap();
        let session = ActivitySession::start(
            SessionId::new(0),
            activity_id,
            SessionKind::Manual,
            fixed_now(),
        );
        repo.insert_session(NewSessionRecord::from_session(&session))
            .await
            .unwrap();
        let err = repo
            .insert_session(NewSessionRecord::from_session(&session))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn deactivate_all_clears_active_challenge() {
        let repo = InMemoryRepository::new();
        let challenge = Challenge::new(
            ChallengeId::new(0),
            fixed_now().date_naive(),
            100.0,
        )
        .unwrap();
        repo.insert_challenge(NewChallengeRecord::from_challenge(&challenge))
            .await
            .unwrap();
        assert!(repo.active_challenge().await.unwrap().is_some());

        repo.deactivate_all().await.unwrap();
        assert!(repo.active_challenge().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_topic_is_not_found() {
        let repo = InMemoryRepository::new();
        let topic = Topic::new(
            TopicId::new(99),
            TopicDraft {
                title: "Ghost".to_owned(),
                category: "None".to_owned(),
                ..TopicDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        let err = repo.update_topic(&topic).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
