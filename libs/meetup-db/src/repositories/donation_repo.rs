use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::donation::{Donation, DonationReport, NewDonation};

#[derive(Debug, Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a successful payment. Returns `None` when the provider charge
    /// was already recorded.
    pub async fn record(&self, donation: &NewDonation<'_>) -> Result<Option<Donation>> {
        let rec = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (amount, currency, guest_id, event_id, donor_tg_id, charge_id)
            VALUES ($1, $2, (SELECT id FROM guests WHERE tg_id = $3), $4, $3, $5)
            ON CONFLICT (charge_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(donation.amount)
        .bind(donation.currency)
        .bind(donation.donor_tg_id)
        .bind(donation.event_id)
        .bind(donation.charge_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to record donation")?;

        match &rec {
            Some(d) => info!(
                "Donation {} recorded: {} {} from {}",
                d.id, d.amount, d.currency, d.donor_tg_id
            ),
            None => warn!("Duplicate payment callback for charge {}", donation.charge_id),
        }
        Ok(rec)
    }

    pub async fn report_for_event(&self, event_id: i64) -> Result<DonationReport> {
        sqlx::query_as::<_, DonationReport>(
            r#"
            SELECT COUNT(*)::BIGINT AS count, COALESCE(SUM(amount), 0)::BIGINT AS total
            FROM donations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to build donation report")
    }
}
