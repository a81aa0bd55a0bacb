use momentum_core::model::{Topic, TopicId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{ser, topic_id_from_i64, u64_to_i64, urls_from_json, urls_to_json};
use crate::repository::{NewTopicRecord, StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<TopicId, StorageError> {
        let urls = urls_to_json(&topic.urls)?;
        let rate_locked = i64::from(topic.rate_locked);

        let res = sqlx::query(
            r"
            INSERT INTO topics (title, category, notes, urls, money_per_5_reps, rate_locked, earnings, completion_percentage, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(topic.title)
        .bind(topic.category)
        .bind(topic.notes)
        .bind(urls)
        .bind(topic.money_per_5_reps)
        .bind(rate_locked)
        .bind(topic.earnings)
        .bind(topic.completion_percentage)
        .bind(topic.created_at)
        .bind(topic.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        topic_id_from_i64(res.last_insert_rowid())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, category, notes, urls, money_per_5_reps, rate_locked, earnings, completion_percentage, created_at, updated_at
            FROM topics WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => topic_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, category, notes, urls, money_per_5_reps, rate_locked, earnings, completion_percentage, created_at, updated_at
            FROM topics
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(topic_from_row(&row)?);
        }
        Ok(topics)
    }

    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let urls = urls_to_json(topic.urls())?;
        let rate_locked = i64::from(topic.rate_locked());

        let res = sqlx::query(
            r"
            UPDATE topics SET
                title = ?2,
                category = ?3,
                notes = ?4,
                urls = ?5,
                money_per_5_reps = ?6,
                rate_locked = ?7,
                earnings = ?8,
                completion_percentage = ?9,
                updated_at = ?10
            WHERE id = ?1
            ",
        )
        .bind(u64_to_i64("id", topic.id().value())?)
        .bind(topic.title())
        .bind(topic.category())
        .bind(topic.notes())
        .bind(urls)
        .bind(topic.money_per_5_reps())
        .bind(rate_locked)
        .bind(topic.earnings())
        .bind(topic.completion_percentage())
        .bind(topic.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM topics WHERE id = ?1")
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

fn topic_from_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    let urls = urls_from_json(&row.try_get::<String, _>("urls").map_err(ser)?)?;

    Topic::from_persisted(
        topic_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("category").map_err(ser)?,
        row.try_get::<Option<String>, _>("notes").map_err(ser)?,
        urls,
        row.try_get::<f64, _>("money_per_5_reps").map_err(ser)?,
        row.try_get::<i64, _>("rate_locked").map_err(ser)? != 0,
        row.try_get::<f64, _>("earnings").map_err(ser)?,
        row.try_get::<f64, _>("completion_percentage").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
