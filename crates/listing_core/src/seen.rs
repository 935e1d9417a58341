use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{parse_listing_date, ListingKey};

/// Keys of listings that have already been notified.
///
/// Keeps the persisted string form in insertion order so saving an unmodified set
/// reproduces the same file. Entries that do not parse as a [`ListingKey`] are carried
/// along untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenListings {
    entries: Vec<String>,
    keys: HashSet<ListingKey>,
}

impl SeenListings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        let keys = entries
            .iter()
            .filter_map(|raw| raw.parse::<ListingKey>().ok())
            .collect();
        Self { entries, keys }
    }

    pub fn contains(&self, key: &ListingKey) -> bool {
        self.keys.contains(key)
    }

    /// Inserts `key`, returning `true` when it was not present before.
    pub fn insert(&mut self, key: ListingKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.entries.push(key.to_string());
        self.keys.insert(key);
        true
    }

    /// Persisted form, in insertion order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops keys dated before `cutoff`. Keys without a parseable date are kept.
    /// Returns the number of entries removed.
    pub fn retain_since(&mut self, cutoff: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|raw| {
            raw.parse::<ListingKey>()
                .ok()
                .and_then(|key| parse_listing_date(&key.date))
                .map_or(true, |date| date >= cutoff)
        });
        self.keys
            .retain(|key| parse_listing_date(&key.date).map_or(true, |date| date >= cutoff));
        before - self.entries.len()
    }
}
