use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use listing_core::{format_alert, listing_date, parse_listing_date, Listing, SeenListings};

use crate::extract::ExtractContext;
use crate::{CycleError, DedupStore, ListingSource, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Hours added to UTC when stamping listing dates.
    pub date_offset_hours: i64,
    /// Forget keys dated more than this many days before today. `None` keeps everything.
    pub retention_days: Option<u32>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            date_offset_hours: 3,
            retention_days: None,
        }
    }
}

/// Runs every source, dedups against the store and alerts on unseen listings.
pub struct ListingAggregator {
    sources: Vec<Box<dyn ListingSource>>,
    store: Arc<dyn DedupStore>,
    notifier: Arc<dyn Notifier>,
    settings: AggregatorSettings,
}

impl ListingAggregator {
    pub fn new(
        sources: Vec<Box<dyn ListingSource>>,
        store: Arc<dyn DedupStore>,
        notifier: Arc<dyn Notifier>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            sources,
            store,
            notifier,
            settings,
        }
    }

    /// One extract -> dedup -> notify pass.
    ///
    /// The updated key set is saved before any alert goes out: if saving fails nothing
    /// is sent and the same listings are retried next cycle. Once saved, a listing is
    /// never alerted again even if its send fails.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, CycleError> {
        let offset_hours = self.settings.date_offset_hours;
        let date = listing_date(now, offset_hours)
            .ok_or(CycleError::DateOutOfRange { offset_hours })?;
        let ctx = ExtractContext { date };

        let mut listings = Vec::new();
        for source in &self.sources {
            match source.collect(&ctx).await {
                Ok(found) => {
                    engine_debug!("{} yielded {} listing(s)", source.name(), found.len());
                    listings.extend(found);
                }
                Err(err) => engine_warn!("{} skipped: {}", source.name(), err),
            }
        }

        let mut seen = self.store.load()?;
        self.apply_retention(&mut seen, &ctx);

        let fresh: Vec<&Listing> = listings
            .iter()
            .filter(|listing| seen.insert(listing.key()))
            .collect();

        self.store.save(&seen)?;

        for listing in &fresh {
            match self.notifier.send(&format_alert(listing)).await {
                Ok(()) => engine_info!("Alerted {}", listing.key()),
                Err(err) => engine_error!("Alert for {} not delivered: {}", listing.key(), err),
            }
        }

        engine_info!(
            "Cycle found {} listing(s), {} new, {} key(s) stored",
            listings.len(),
            fresh.len(),
            seen.len()
        );
        Ok(listings)
    }

    fn apply_retention(&self, seen: &mut SeenListings, ctx: &ExtractContext) {
        let Some(days) = self.settings.retention_days else {
            return;
        };
        let Some(today) = parse_listing_date(&ctx.date) else {
            return;
        };
        let cutoff = TimeDelta::try_days(i64::from(days))
            .and_then(|window| today.checked_sub_signed(window));
        let Some(cutoff) = cutoff else {
            engine_warn!("Retention of {} day(s) is out of range; keeping all keys", days);
            return;
        };
        let dropped = seen.retain_since(cutoff);
        if dropped > 0 {
            engine_info!("Dropped {} key(s) dated before {}", dropped, cutoff);
        }
    }
}
