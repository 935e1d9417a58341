use std::sync::Arc;

use chrono::{DateTime, Utc};
use engine_logging::{engine_error, engine_info, engine_warn};
use listing_core::{digest_due, format_digest_day, format_empty_digest, plan_digest, ListingKey};

use crate::{CycleError, DedupStore, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSettings {
    /// UTC hour (0-23) during which the daily digest goes out.
    pub digest_hour: u32,
    /// Same offset the aggregator stamps listing dates with.
    pub date_offset_hours: i64,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            digest_hour: 8,
            date_offset_hours: 3,
        }
    }
}

/// Daily summary of stored listings dated today or tomorrow.
pub struct DigestScheduler {
    store: Arc<dyn DedupStore>,
    notifier: Arc<dyn Notifier>,
    settings: DigestSettings,
}

impl DigestScheduler {
    pub fn new(
        store: Arc<dyn DedupStore>,
        notifier: Arc<dyn Notifier>,
        settings: DigestSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            settings,
        }
    }

    /// Sends the digest if it is due and returns the new last-digest time
    /// (`now` when sent, `last_digest` otherwise).
    pub async fn maybe_send_digest(
        &self,
        now: DateTime<Utc>,
        last_digest: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CycleError> {
        if !digest_due(now, last_digest, self.settings.digest_hour) {
            return Ok(last_digest);
        }

        let seen = self.store.load()?;
        let unreadable = seen
            .entries()
            .iter()
            .filter(|raw| raw.parse::<ListingKey>().is_err())
            .count();
        if unreadable > 0 {
            engine_warn!("Digest ignores {} unreadable key(s)", unreadable);
        }

        let offset_hours = self.settings.date_offset_hours;
        let plan = plan_digest(&seen, now, offset_hours)
            .ok_or(CycleError::DateOutOfRange { offset_hours })?;
        let messages = if plan.is_empty() {
            vec![format_empty_digest()]
        } else {
            plan.days.iter().map(format_digest_day).collect()
        };

        for message in &messages {
            if let Err(err) = self.notifier.send(message).await {
                engine_error!("Digest message not delivered: {}", err);
            }
        }
        engine_info!("Digest sent covering {} day(s)", plan.days.len());
        Ok(now)
    }
}
