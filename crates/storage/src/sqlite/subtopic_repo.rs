use momentum_core::model::{Subtopic, SubtopicId, TopicId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    ser, subtopic_id_from_i64, topic_id_from_i64, u32_from_i64, u64_to_i64, urls_from_json,
    urls_to_json,
};
use crate::repository::{NewSubtopicRecord, StorageError, SubtopicRepository};

#[async_trait::async_trait]
impl SubtopicRepository for SqliteRepository {
    async fn insert_subtopic(
        &self,
        subtopic: NewSubtopicRecord,
    ) -> Result<SubtopicId, StorageError> {
        let urls = urls_to_json(&subtopic.urls)?;

        let res = sqlx::query(
            r"
            INSERT INTO subtopics (topic_id, title, notes, urls, reps_completed, reps_goal, goal_amount)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(u64_to_i64("topic_id", subtopic.topic_id.value())?)
        .bind(subtopic.title)
        .bind(subtopic.notes)
        .bind(urls)
        .bind(i64::from(subtopic.reps_completed))
        .bind(i64::from(subtopic.reps_goal))
        .bind(subtopic.goal_amount)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        subtopic_id_from_i64(res.last_insert_rowid())
    }

    async fn get_subtopic(&self, id: SubtopicId) -> Result<Option<Subtopic>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, topic_id, title, notes, urls, reps_completed, goal_amount
            FROM subtopics WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => subtopic_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn subtopics_for_topic(&self, topic_id: TopicId) -> Result<Vec<Subtopic>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, topic_id, title, notes, urls, reps_completed, goal_amount
            FROM subtopics
            WHERE topic_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(u64_to_i64("topic_id", topic_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut subtopics = Vec::with_capacity(rows.len());
        for row in rows {
            subtopics.push(subtopic_from_row(&row)?);
        }
        Ok(subtopics)
    }

    async fn update_subtopic(&self, subtopic: &Subtopic) -> Result<(), StorageError> {
        let urls = urls_to_json(subtopic.urls())?;

        let res = sqlx::query(
            r"
            UPDATE subtopics SET
                title = ?2,
                notes = ?3,
                urls = ?4,
                reps_completed = ?5,
                goal_amount = ?6
            WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", subtopic.id().value())?)
        .bind(subtopic.title())
        .bind(subtopic.notes())
        .bind(urls)
        .bind(i64::from(subtopic.reps_completed()))
        .bind(subtopic.goal_amount())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_subtopic(&self, id: SubtopicId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM subtopics WHERE id = ?1")
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

fn subtopic_from_row(row: &SqliteRow) -> Result<Subtopic, StorageError> {
    let urls = urls_from_json(&row.try_get::<String, _>("urls").map_err(ser)?)?;

    Subtopic::from_persisted(
        subtopic_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        topic_id_from_i64(row.try_get::<i64, _>("topic_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<Option<String>, _>("notes").map_err(ser)?,
        urls,
        u32_from_i64(
            "reps_completed",
            row.try_get::<i64, _>("reps_completed").map_err(ser)?,
        )?,
        row.try_get::<f64, _>("goal_amount").map_err(ser)?,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
