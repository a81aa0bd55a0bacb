use momentum_core::model::{
    ActivityId, ChallengeId, SessionId, SessionKind, SubtopicId, TopicId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn topic_id_from_i64(v: i64) -> Result<TopicId, StorageError> {
    Ok(TopicId::new(i64_to_u64("topic_id", v)?))
}

pub(crate) fn subtopic_id_from_i64(v: i64) -> Result<SubtopicId, StorageError> {
    Ok(SubtopicId::new(i64_to_u64("subtopic_id", v)?))
}

pub(crate) fn activity_id_from_i64(v: i64) -> Result<ActivityId, StorageError> {
    Ok(ActivityId::new(i64_to_u64("activity_id", v)?))
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(i64_to_u64("session_id", v)?))
}

pub(crate) fn challenge_id_from_i64(v: i64) -> Result<ChallengeId, StorageError> {
    Ok(ChallengeId::new(i64_to_u64("challenge_id", v)?))
}

pub(crate) fn parse_session_kind(s: &str) -> Result<SessionKind, StorageError> {
    s.parse::<SessionKind>().map_err(ser)
}

/// URL lists are stored as a JSON array in a TEXT column.
pub(crate) fn urls_to_json(urls: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(urls).map_err(ser)
}

pub(crate) fn urls_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

/// Maps unique-index violations to `Conflict`, everything else to
/// `Connection`. Insert paths rely on this to surface duplicate activity
/// names and second active sessions.
pub(crate) fn map_query_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}
