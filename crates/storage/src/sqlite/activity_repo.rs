use momentum_core::model::{Activity, ActivityId, Goals};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{activity_id_from_i64, map_query_err, ser, u32_from_i64, u64_to_i64};
use crate::repository::{ActivityRepository, NewActivityRecord, StorageError};

#[async_trait::async_trait]
impl ActivityRepository for SqliteRepository {
    async fn insert_activity(
        &self,
        activity: NewActivityRecord,
    ) -> Result<ActivityId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO activities (name, reps, daily_goal, weekly_goal, monthly_goal, yearly_goal, time_based, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(activity.name)
        .bind(i64::from(activity.reps))
        .bind(i64::from(activity.goals.daily))
        .bind(i64::from(activity.goals.weekly))
        .bind(i64::from(activity.goals.monthly))
        .bind(i64::from(activity.goals.yearly))
        .bind(i64::from(activity.time_based))
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_query_err)?;

        activity_id_from_i64(res.last_insert_rowid())
    }

    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, reps, daily_goal, weekly_goal, monthly_goal, yearly_goal, time_based, created_at, updated_at
            FROM activities WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => activity_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list_activities(&self) -> Result<Vec<Activity>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, reps, daily_goal, weekly_goal, monthly_goal, yearly_goal, time_based, created_at, updated_at
            FROM activities
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut activities = Vec::with_capacity(rows.len());
        for row in rows {
            activities.push(activity_from_row(&row)?);
        }
        Ok(activities)
    }

    async fn update_activity(&self, activity: &Activity) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE activities SET
                name = ?2,
                reps = ?3,
                daily_goal = ?4,
                weekly_goal = ?5,
                monthly_goal = ?6,
                yearly_goal = ?7,
                time_based = ?8,
                updated_at = ?9
            WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", activity.id().value())?)
        .bind(activity.name())
        .bind(i64::from(activity.reps()))
        .bind(i64::from(activity.goals().daily))
        .bind(i64::from(activity.goals().weekly))
        .bind(i64::from(activity.goals().monthly))
        .bind(i64::from(activity.goals().yearly))
        .bind(i64::from(activity.time_based()))
        .bind(activity.updated_at())
        .execute(&self.pool)
        .await
        .map_err(map_query_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_activity(&self, id: ActivityId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM activities WHERE id = ?1")
            .bind(u64_to_i64("id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

fn activity_from_row(row: &SqliteRow) -> Result<Activity, StorageError> {
    let goals = Goals {
        daily: u32_from_i64("daily_goal", row.try_get::<i64, _>("daily_goal").map_err(ser)?)?,
        weekly: u32_from_i64(
            "weekly_goal",
            row.try_get::<i64, _>("weekly_goal").map_err(ser)?,
        )?,
        monthly: u32_from_i64(
            "monthly_goal",
            row.try_get::<i64, _>("monthly_goal").map_err(ser)?,
        )?,
        yearly: u32_from_i64(
            "yearly_goal",
            row.try_get::<i64, _>("yearly_goal").map_err(ser)?,
        )?,
    };

    Activity::from_persisted(
        activity_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        u32_from_i64("reps", row.try_get::<i64, _>("reps").map_err(ser)?)?,
        goals,
        row.try_get::<i64, _>("time_based").map_err(ser)? != 0,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
