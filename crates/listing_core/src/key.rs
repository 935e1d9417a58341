use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator between fields of a persisted key.
pub const KEY_DELIMITER: char = '_';

/// Dedup identity of a listing.
///
/// Persisted as `{exchange}_{coin}_{date}`. Parsing takes the exchange up to the first
/// delimiter and the date after the last one, so a coin containing the delimiter
/// survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingKey {
    pub exchange: String,
    pub coin: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed listing key {0:?}")]
pub struct ParseKeyError(pub String);

impl ListingKey {
    pub fn new(
        exchange: impl Into<String>,
        coin: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            coin: coin.into(),
            date: date.into(),
        }
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.exchange, self.coin, self.date
        )
    }
}

impl FromStr for ListingKey {
    type Err = ParseKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseKeyError(raw.to_string());
        let (exchange, rest) = raw.split_once(KEY_DELIMITER).ok_or_else(malformed)?;
        let (coin, date) = rest.rsplit_once(KEY_DELIMITER).ok_or_else(malformed)?;
        if exchange.is_empty() || date.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(exchange, coin, date))
    }
}
