use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::guest::{Guest, GuestProfile};

#[derive(Debug, Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_tg_id(&self, tg_id: i64) -> Result<Option<Guest>> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE tg_id = $1")
            .bind(tg_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch guest by TG ID")
    }

    /// Registers a guest or overwrites the profile of an existing one.
    /// Calling it twice with the same profile leaves a single identical row.
    pub async fn upsert(&self, profile: &GuestProfile) -> Result<Guest> {
        let guest = sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (tg_id, name, phone, kind_activity, projects, open_for_contact)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tg_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                kind_activity = EXCLUDED.kind_activity,
                projects = EXCLUDED.projects,
                open_for_contact = EXCLUDED.open_for_contact,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(profile.tg_id)
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.kind_activity)
        .bind(&profile.projects)
        .bind(profile.open_for_contact)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert guest")?;

        info!("Guest {} registered (id {})", guest.tg_id, guest.id);
        Ok(guest)
    }

    /// Speakers are assigned by TG ID and name only; a registered guest keeps
    /// the rest of their profile.
    pub async fn upsert_speaker(&self, tg_id: i64, name: &str) -> Result<Guest> {
        sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (tg_id, name)
            VALUES ($1, $2)
            ON CONFLICT (tg_id) DO UPDATE SET
                name = EXCLUDED.name,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tg_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert speaker")
    }

    /// Guests who agreed to share their contacts, excluding the caller.
    pub async fn contacts(&self, exclude_tg_id: i64, limit: i64) -> Result<Vec<Guest>> {
        sqlx::query_as::<_, Guest>(
            r#"
            SELECT * FROM guests
            WHERE open_for_contact = TRUE AND tg_id <> $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(exclude_tg_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch contacts")
    }

    /// Every chat the bot knows about: registered guests and event attendees.
    pub async fn all_tg_ids(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT tg_id FROM guests
            UNION
            SELECT tg_id FROM event_attendees
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch known chat IDs")
    }
}
