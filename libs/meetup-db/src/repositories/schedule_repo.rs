use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::schedule::{NEW_SPEECH_TOPIC, Speech, SpeechField, new_speech_time};

#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_event(&self, event_id: i64) -> Result<Vec<Speech>> {
        sqlx::query_as::<_, Speech>(
            r#"
            SELECT s.id, s.event_id, s.topic, s.start_at, s.end_at, s.speaker_id,
                   g.name AS speaker_name, g.tg_id AS speaker_tg_id, s.active
            FROM schedules s
            LEFT JOIN guests g ON g.id = s.speaker_id
            WHERE s.event_id = $1
            ORDER BY s.start_at ASC, s.id ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch event schedule")
    }

    pub async fn get(&self, id: i64) -> Result<Option<Speech>> {
        sqlx::query_as::<_, Speech>(
            r#"
            SELECT s.id, s.event_id, s.topic, s.start_at, s.end_at, s.speaker_id,
                   g.name AS speaker_name, g.tg_id AS speaker_tg_id, s.active
            FROM schedules s
            LEFT JOIN guests g ON g.id = s.speaker_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch speech by ID")
    }

    /// Adds a placeholder speech (`09:00-09:00 "New..."`) to the event.
    pub async fn create(&self, event_id: i64) -> Result<Speech> {
        let start = new_speech_time();
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO schedules (event_id, topic, start_at, end_at) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(event_id)
        .bind(NEW_SPEECH_TOPIC)
        .bind(start)
        .bind(start)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create speech")?;

        self.get(id)
            .await?
            .context("Speech disappeared right after insert")
    }

    pub async fn update_field(&self, id: i64, field: &SpeechField) -> Result<Option<Speech>> {
        let res = match field {
            SpeechField::Start(time) => {
                sqlx::query("UPDATE schedules SET start_at = $1 WHERE id = $2")
                    .bind(*time)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
            SpeechField::End(time) => {
                sqlx::query("UPDATE schedules SET end_at = $1 WHERE id = $2")
                    .bind(*time)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
            SpeechField::Topic(topic) => {
                sqlx::query("UPDATE schedules SET topic = $1 WHERE id = $2")
                    .bind(topic)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
        }
        .context("Failed to update speech")?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn set_speaker(&self, id: i64, guest_id: i64) -> Result<Option<Speech>> {
        let res = sqlx::query("UPDATE schedules SET speaker_id = $1 WHERE id = $2")
            .bind(guest_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set speaker")?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Deletes the speech and returns the event it belonged to.
    pub async fn delete(&self, id: i64) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("DELETE FROM schedules WHERE id = $1 RETURNING event_id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to delete speech")
    }

    /// Makes `id` the only active speech, see `EventRepository::set_active`.
    pub async fn set_active(&self, id: i64) -> Result<Option<Speech>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("LOCK TABLE schedules IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .context("Failed to lock schedules")?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up speech")?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE schedules SET active = FALSE WHERE active = TRUE AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear active speech")?;

        sqlx::query("UPDATE schedules SET active = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to activate speech")?;

        tx.commit().await.context("Failed to commit speech activation")?;
        info!("Speech {} is now active", id);
        self.get(id).await
    }

    pub async fn get_active(&self) -> Result<Option<Speech>> {
        sqlx::query_as::<_, Speech>(
            r#"
            SELECT s.id, s.event_id, s.topic, s.start_at, s.end_at, s.speaker_id,
                   g.name AS speaker_name, g.tg_id AS speaker_tg_id, s.active
            FROM schedules s
            LEFT JOIN guests g ON g.id = s.speaker_id
            WHERE s.active = TRUE
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch active speech")
    }

    pub async fn get_active_for_event(&self, event_id: i64) -> Result<Option<Speech>> {
        sqlx::query_as::<_, Speech>(
            r#"
            SELECT s.id, s.event_id, s.topic, s.start_at, s.end_at, s.speaker_id,
                   g.name AS speaker_name, g.tg_id AS speaker_tg_id, s.active
            FROM schedules s
            LEFT JOIN guests g ON g.id = s.speaker_id
            WHERE s.active = TRUE AND s.event_id = $1
            LIMIT 1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch active speech of event")
    }
}
