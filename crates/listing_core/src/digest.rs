use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::{listing_date, ListingKey, SeenListings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub exchange: String,
    pub coin: String,
}

/// Listings scheduled for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestDay {
    pub date: String,
    pub entries: Vec<DigestEntry>,
}

/// Digest content: today's group first, then tomorrow's. Days without listings are
/// omitted, so an empty plan means "nothing scheduled".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigestPlan {
    pub days: Vec<DigestDay>,
}

impl DigestPlan {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Whether the daily digest should go out at `now`.
///
/// True during `digest_hour` (UTC) unless a digest was already sent on the same UTC
/// calendar day, so repeated polls within the hour fire only once.
pub fn digest_due(now: DateTime<Utc>, last_digest: DateTime<Utc>, digest_hour: u32) -> bool {
    now.hour() == digest_hour && now.date_naive() != last_digest.date_naive()
}

/// Groups seen keys dated today or tomorrow relative to `now` shifted by
/// `offset_hours`, the same shift used when listings were stamped.
/// `None` when the offset pushes the window out of chrono's range.
pub fn plan_digest(
    seen: &SeenListings,
    now: DateTime<Utc>,
    offset_hours: i64,
) -> Option<DigestPlan> {
    let today = listing_date(now, offset_hours)?;
    let tomorrow = listing_date(now.checked_add_signed(TimeDelta::days(1))?, offset_hours)?;

    let mut days = Vec::new();
    for date in [today, tomorrow] {
        let entries: Vec<DigestEntry> = seen
            .entries()
            .iter()
            .filter_map(|raw| raw.parse::<ListingKey>().ok())
            .filter(|key| key.date == date)
            .map(|key| DigestEntry {
                exchange: key.exchange,
                coin: key.coin,
            })
            .collect();
        if !entries.is_empty() {
            days.push(DigestDay { date, entries });
        }
    }
    Some(DigestPlan { days })
}
