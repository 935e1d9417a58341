use crate::ListingKey;

/// A new-listing announcement detected on an exchange page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub exchange: String,
    pub coin: String,
    pub title: String,
    pub link: String,
    pub spot_time: Option<String>,
    pub futures_time: Option<String>,
    /// `DD.MM.YYYY`, see [`crate::listing_date`].
    pub date: String,
}

impl Listing {
    /// Identity used for dedup: two listings with the same exchange, coin and date are
    /// the same event even when title or link differ.
    pub fn key(&self) -> ListingKey {
        ListingKey::new(&self.exchange, &self.coin, &self.date)
    }
}
