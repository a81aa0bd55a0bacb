use chrono::NaiveDate;
use momentum_core::model::{Challenge, ChallengeId, ChallengeProgress};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{challenge_id_from_i64, ser, u32_from_i64, u64_to_i64};
use crate::repository::{
    ChallengeRepository, NewChallengeRecord, ProgressRepository, StorageError,
};

#[async_trait::async_trait]
impl ChallengeRepository for SqliteRepository {
    async fn insert_challenge(
        &self,
        challenge: NewChallengeRecord,
    ) -> Result<ChallengeId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO challenges (start_date, end_date, ultimate_focus_goal_hours, active)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(challenge.start_date)
        .bind(challenge.end_date)
        .bind(challenge.ultimate_focus_goal_hours)
        .bind(i64::from(challenge.active))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        challenge_id_from_i64(res.last_insert_rowid())
    }

    async fn active_challenge(&self) -> Result<Option<Challenge>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, start_date, end_date, ultimate_focus_goal_hours, active
            FROM challenges
            WHERE active = 1
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => challenge_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn deactivate_all(&self) -> Result<(), StorageError> {
        sqlx::query("UPDATE challenges SET active = 0 WHERE active = 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        challenge_id: ChallengeId,
        date: NaiveDate,
    ) -> Result<Option<ChallengeProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT challenge_id, date, focus_minutes, countdown_seconds, quote, in_active_window, updated_at
            FROM challenge_progress
            WHERE challenge_id = ?1 AND date = ?2
            ",
        )
        .bind(u64_to_i64("challenge_id", challenge_id.value())?)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => progress_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn upsert_progress(&self, progress: &ChallengeProgress) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenge_progress (challenge_id, date, focus_minutes, countdown_seconds, quote, in_active_window, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(challenge_id, date) DO UPDATE SET
                focus_minutes = excluded.focus_minutes,
                countdown_seconds = excluded.countdown_seconds,
                quote = excluded.quote,
                in_active_window = excluded.in_active_window,
                updated_at = excluded.updated_at
            ",
        )
        .bind(u64_to_i64("challenge_id", progress.challenge_id().value())?)
        .bind(progress.date())
        .bind(i64::from(progress.focus_minutes()))
        .bind(progress.countdown_seconds())
        .bind(progress.quote())
        .bind(i64::from(progress.in_active_window()))
        .bind(progress.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn progress_for_challenge(
        &self,
        challenge_id: ChallengeId,
    ) -> Result<Vec<ChallengeProgress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT challenge_id, date, focus_minutes, countdown_seconds, quote, in_active_window, updated_at
            FROM challenge_progress
            WHERE challenge_id = ?1
            ORDER BY date ASC
            ",
        )
        .bind(u64_to_i64("challenge_id", challenge_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in rows {
            progress.push(progress_from_row(&row)?);
        }
        Ok(progress)
    }
}

fn challenge_from_row(row: &SqliteRow) -> Result<Challenge, StorageError> {
    Challenge::from_persisted(
        challenge_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("start_date").map_err(ser)?,
        row.try_get("end_date").map_err(ser)?,
        row.try_get::<f64, _>("ultimate_focus_goal_hours").map_err(ser)?,
        row.try_get::<i64, _>("active").map_err(ser)? != 0,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn progress_from_row(row: &SqliteRow) -> Result<ChallengeProgress, StorageError> {
    Ok(ChallengeProgress::from_persisted(
        challenge_id_from_i64(row.try_get::<i64, _>("challenge_id").map_err(ser)?)?,
        row.try_get("date").map_err(ser)?,
        u32_from_i64(
            "focus_minutes",
            row.try_get::<i64, _>("focus_minutes").map_err(ser)?,
        )?,
        row.try_get::<i64, _>("countdown_seconds").map_err(ser)?,
        row.try_get::<Option<String>, _>("quote").map_err(ser)?,
        row.try_get::<i64, _>("in_active_window").map_err(ser)? != 0,
        row.try_get("updated_at").map_err(ser)?,
    ))
}
