use momentum_core::model::{ActivityId, ActivitySession, SessionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    activity_id_from_i64, map_query_err, parse_session_kind, ser, session_id_from_i64,
    u32_from_i64, u64_to_i64,
};
use crate::repository::{NewSessionRecord, SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: NewSessionRecord) -> Result<SessionId, StorageError> {
        let duration = session.duration_minutes.map(i64::from);

        // The partial unique index on (activity_id) WHERE active = 1 turns a
        // racing second insert into a Conflict here.
        let res = sqlx::query(
            r"
            INSERT INTO activity_sessions (activity_id, started_at, ended_at, duration_minutes, active, kind)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(u64_to_i64("activity_id", session.activity_id.value())?)
        .bind(session.started_at)
        .bind(session.ended_at)
        .bind(duration)
        .bind(i64::from(session.active))
        .bind(session.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_query_err)?;

        session_id_from_i64(res.last_insert_rowid())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ActivitySession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, activity_id, started_at, ended_at, duration_minutes, active, kind
            FROM activity_sessions WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => session_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn active_session(
        &self,
        activity_id: ActivityId,
    ) -> Result<Option<ActivitySession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, activity_id, started_at, ended_at, duration_minutes, active, kind
            FROM activity_sessions
            WHERE activity_id = ?1 AND active = 1
            ",
        )
        .bind(u64_to_i64("activity_id", activity_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => session_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn sessions_for_activity(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivitySession>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, activity_id, started_at, ended_at, duration_minutes, active, kind
            FROM activity_sessions
            WHERE activity_id = ?1
            ORDER BY started_at DESC
            ",
        )
        .bind(u64_to_i64("activity_id", activity_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(session_from_row(&row)?);
        }
        Ok(sessions)
    }

    async fn update_session(&self, session: &ActivitySession) -> Result<(), StorageError> {
        let duration = session.duration_minutes().map(i64::from);

        let res = sqlx::query(
            r"
            UPDATE activity_sessions SET
                ended_at = ?2,
                duration_minutes = ?3,
                active = ?4
            WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", session.id().value())?)
        .bind(session.ended_at())
        .bind(duration)
        .bind(i64::from(session.is_active()))
        .execute(&self.pool)
        .await
        .map_err(map_query_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn count_active_sessions(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM activity_sessions WHERE active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(|_| StorageError::Serialization("negative count".into()))
    }
}

fn session_from_row(row: &SqliteRow) -> Result<ActivitySession, StorageError> {
    let kind_str: String = row.try_get("kind").map_err(ser)?;
    let duration = row
        .try_get::<Option<i64>, _>("duration_minutes")
        .map_err(ser)?
        .map(|v| u32_from_i64("duration_minutes", v))
        .transpose()?;

    ActivitySession::from_persisted(
        session_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        activity_id_from_i64(row.try_get::<i64, _>("activity_id").map_err(ser)?)?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("ended_at").map_err(ser)?,
        duration,
        row.try_get::<i64, _>("active").map_err(ser)? != 0,
        parse_session_kind(kind_str.as_str())?,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
