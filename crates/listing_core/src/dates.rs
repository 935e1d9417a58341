use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Day-first date format used in listing keys and messages, e.g. `01.01.2025`.
pub const LISTING_DATE_FORMAT: &str = "%d.%m.%Y";

/// Listing date stamped at extraction time: `now` shifted by `offset_hours`.
/// `None` when the shifted time is outside chrono's representable range.
pub fn listing_date(now: DateTime<Utc>, offset_hours: i64) -> Option<String> {
    let shifted = now.checked_add_signed(TimeDelta::try_hours(offset_hours)?)?;
    Some(shifted.format(LISTING_DATE_FORMAT).to_string())
}

pub fn parse_listing_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, LISTING_DATE_FORMAT).ok()
}
