use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::event::Event;
use crate::models::schedule::TEMPLATE_SCHEDULE;

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY date DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch events")
    }

    pub async fn upcoming(&self, from: NaiveDate) -> Result<Vec<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE date >= $1 ORDER BY date ASC, id ASC")
            .bind(from)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch upcoming events")
    }

    pub async fn get(&self, id: i64) -> Result<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch event by ID")
    }

    pub async fn get_active(&self) -> Result<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE active = TRUE LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch active event")
    }

    /// Creates the event together with the default slot template, atomically.
    pub async fn create_with_template(&self, topic: &str, date: NaiveDate) -> Result<Event> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (topic, date) VALUES ($1, $2) RETURNING *",
        )
        .bind(topic)
        .bind(date)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create event")?;

        for slot in TEMPLATE_SCHEDULE {
            let Some((start_at, end_at)) = slot.times() else {
                warn!("Skipping malformed template slot {:?}", slot);
                continue;
            };
            sqlx::query(
                "INSERT INTO schedules (event_id, topic, start_at, end_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(event.id)
            .bind(slot.topic)
            .bind(start_at)
            .bind(end_at)
            .execute(&mut *tx)
            .await
            .context("Failed to create template schedule")?;
        }

        tx.commit().await.context("Failed to commit event creation")?;
        info!("Created event {} \"{}\" on {}", event.id, event.topic, event.date);
        Ok(event)
    }

    pub async fn update(&self, id: i64, topic: &str, date: NaiveDate) -> Result<Option<Event>> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET topic = $1, date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(topic)
        .bind(date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update event")
    }

    /// Returns `false` when no such event existed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete event")?;
        Ok(res.rows_affected() > 0)
    }

    /// Makes `id` the only active event.
    ///
    /// The table lock serialises concurrent admins; together with the partial
    /// unique index this always leaves exactly one active row. An unknown id
    /// rolls back without touching the current active event.
    pub async fn set_active(&self, id: i64) -> Result<Option<Event>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("LOCK TABLE events IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .context("Failed to lock events")?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up event")?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE events SET active = FALSE WHERE active = TRUE AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear active event")?;

        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET active = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to activate event")?;

        tx.commit().await.context("Failed to commit event activation")?;
        info!("Event {} is now active", id);
        Ok(Some(event))
    }

    pub async fn add_attendee(&self, event_id: i64, tg_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO event_attendees (event_id, tg_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(tg_id)
        .execute(&self.pool)
        .await
        .context("Failed to record attendee")?;
        Ok(())
    }

    pub async fn attendee_ids(&self, event_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT tg_id FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch attendees")
    }

    pub async fn speaker_ids(&self, event_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT g.tg_id
            FROM schedules s
            INNER JOIN guests g ON g.id = s.speaker_id
            WHERE s.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch event speakers")
    }
}
