use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::question::{Question, SpeakerQuestion};

#[derive(Debug, Clone)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a question; the guest link is resolved from the asker's TG ID
    /// and left empty for unregistered users.
    pub async fn create(&self, schedule_id: i64, asked_by_tg_id: i64, text: &str) -> Result<Question> {
        sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (question, schedule_id, guest_id, asked_by_tg_id)
            VALUES ($1, $2, (SELECT id FROM guests WHERE tg_id = $3), $3)
            RETURNING *
            "#,
        )
        .bind(text)
        .bind(schedule_id)
        .bind(asked_by_tg_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create question")
    }

    pub async fn for_schedule(&self, schedule_id: i64) -> Result<Vec<Question>> {
        sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE schedule_id = $1 ORDER BY created_at ASC",
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch questions of speech")
    }

    /// Latest questions addressed to any speech the given user speaks at.
    pub async fn for_speaker(&self, speaker_tg_id: i64, limit: i64) -> Result<Vec<SpeakerQuestion>> {
        sqlx::query_as::<_, SpeakerQuestion>(
            r#"
            SELECT q.id, q.question, s.topic AS speech_topic, g.name AS asker_name, q.created_at
            FROM questions q
            INNER JOIN schedules s ON s.id = q.schedule_id
            INNER JOIN guests sp ON sp.id = s.speaker_id
            LEFT JOIN guests g ON g.id = q.guest_id
            WHERE sp.tg_id = $1
            ORDER BY q.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(speaker_tg_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch speaker questions")
    }
}
