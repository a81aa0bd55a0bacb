//! Shared error types for the services crate.

use thiserror::Error;

use momentum_core::model::{
    ActivityError, ChallengeError, SessionStateError, SettingsError, SubtopicError, TopicError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `TopicService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopicServiceError {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Subtopic(#[from] SubtopicError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ActivityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityServiceError {
    #[error("activity name is already taken")]
    NameTaken,
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error("an active session already exists for this activity")]
    ActiveSessionExists,
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ChallengeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChallengeServiceError {
    #[error("no active challenge")]
    NoActiveChallenge,
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Topics(#[from] TopicServiceError),
    #[error(transparent)]
    Activities(#[from] ActivityServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
