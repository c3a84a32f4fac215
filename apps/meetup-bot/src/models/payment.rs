use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("unknown invoice payload {0:?}")]
    Unknown(String),
    #[error("malformed invoice payload {0:?}")]
    Malformed(String),
}

/// Everything needed to persist a donation, carried through Telegram inside
/// the invoice payload so nothing is kept in process memory between the
/// invoice and the payment callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationPayload {
    pub tg_id: i64,
    pub event_id: Option<i64>,
    /// Whole currency units.
    pub amount: i64,
}

impl DonationPayload {
    const PREFIX: &'static str = "donation";

    pub fn to_payload_string(&self) -> String {
        let event = self
            .event_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{}:{}:{}:{}", Self::PREFIX, self.tg_id, event, self.amount)
    }

    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let mut parts = payload.split(':');
        if parts.next() != Some(Self::PREFIX) {
            return Err(PayloadError::Unknown(payload.to_string()));
        }
        let malformed = || PayloadError::Malformed(payload.to_string());

        let tg_id = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let event_id = match parts.next().ok_or_else(malformed)? {
            "-" => None,
            id => Some(id.parse().map_err(|_| malformed())?),
        };
        let amount: i64 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .filter(|a| *a > 0)
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            tg_id,
            event_id,
            amount,
        })
    }

    /// Telegram prices are in the smallest currency unit.
    pub fn minor_units(&self) -> Option<u32> {
        self.amount.checked_mul(100).and_then(|v| u32::try_from(v).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_survives_telegram() {
        let with_event = DonationPayload {
            tg_id: 123456789,
            event_id: Some(7),
            amount: 500,
        };
        let without_event = DonationPayload {
            event_id: None,
            ..with_event
        };
        for p in [with_event, without_event] {
            let encoded = p.to_payload_string();
            assert!(encoded.len() <= 128);
            assert_eq!(DonationPayload::parse(&encoded), Ok(p));
        }
        assert_eq!(with_event.to_payload_string(), "donation:123456789:7:500");
        assert_eq!(without_event.to_payload_string(), "donation:123456789:-:500");
    }

    #[test]
    fn foreign_and_broken_payloads_are_rejected() {
        assert!(matches!(
            DonationPayload::parse("subscription:1:2"),
            Err(PayloadError::Unknown(_))
        ));
        for bad in [
            "donation",
            "donation:abc:-:5",
            "donation:1:x:5",
            "donation:1:-:0",
            "donation:1:-:5:extra",
        ] {
            assert!(
                matches!(DonationPayload::parse(bad), Err(PayloadError::Malformed(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn minor_units_guard_overflow() {
        let p = DonationPayload {
            tg_id: 1,
            event_id: None,
            amount: 1_000_000,
        };
        assert_eq!(p.minor_units(), Some(100_000_000));
        let huge = DonationPayload {
            amount: i64::MAX,
            ..p
        };
        assert_eq!(huge.minor_units(), None);
    }
}
