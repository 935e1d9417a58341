//! Listing core: pure listing model, dedup set and digest planning.
mod dates;
mod digest;
mod key;
mod listing;
mod message;
mod seen;

pub use dates::{listing_date, parse_listing_date, LISTING_DATE_FORMAT};
pub use digest::{digest_due, plan_digest, DigestDay, DigestEntry, DigestPlan};
pub use key::{ListingKey, ParseKeyError, KEY_DELIMITER};
pub use listing::Listing;
pub use message::{escape_html, format_alert, format_digest_day, format_empty_digest};
pub use seen::SeenListings;
