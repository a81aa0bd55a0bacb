use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: topics with subtopics, global settings,
/// activities with sessions, challenges with daily progress, and indexes.
/// The partial unique index on active sessions backs the one-active-session
/// invariant at the storage layer.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS topics (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    category TEXT NOT NULL,
                    notes TEXT,
                    urls TEXT NOT NULL,
                    money_per_5_reps REAL NOT NULL CHECK (money_per_5_reps >= 0),
                    rate_locked INTEGER NOT NULL,
                    earnings REAL NOT NULL,
                    completion_percentage REAL NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS subtopics (
                    id INTEGER PRIMARY KEY,
                    topic_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    notes TEXT,
                    urls TEXT NOT NULL,
                    reps_completed INTEGER NOT NULL CHECK (reps_completed >= 0),
                    reps_goal INTEGER NOT NULL,
                    goal_amount REAL NOT NULL CHECK (goal_amount > 0),
                    FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS global_settings (
                    key TEXT PRIMARY KEY,
                    value REAL NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS activities (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    reps INTEGER NOT NULL CHECK (reps >= 0),
                    daily_goal INTEGER NOT NULL,
                    weekly_goal INTEGER NOT NULL,
                    monthly_goal INTEGER NOT NULL,
                    yearly_goal INTEGER NOT NULL,
                    time_based INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS activity_sessions (
                    id INTEGER PRIMARY KEY,
                    activity_id INTEGER NOT NULL,
                    started_at TEXT NOT NULL,
                    ended_at TEXT,
                    duration_minutes INTEGER CHECK (duration_minutes >= 0),
                    active INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    FOREIGN KEY (activity_id) REFERENCES activities(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS challenges (
                    id INTEGER PRIMARY KEY,
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    ultimate_focus_goal_hours REAL NOT NULL CHECK (ultimate_focus_goal_hours >= 0),
                    active INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS challenge_progress (
                    id INTEGER PRIMARY KEY,
                    challenge_id INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    focus_minutes INTEGER NOT NULL CHECK (focus_minutes >= 0),
                    countdown_seconds INTEGER NOT NULL,
                    quote TEXT,
                    in_active_window INTEGER NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (challenge_id, date),
                    FOREIGN KEY (challenge_id) REFERENCES challenges(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_subtopics_topic
                    ON subtopics(topic_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_sessions_activity_started
                    ON activity_sessions(activity_id, started_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        // One active session per activity, enforced by the store itself.
        sqlx::query(
            r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_active
                    ON activity_sessions(activity_id) WHERE active = 1;
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_challenges_active
                    ON challenges(active);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
