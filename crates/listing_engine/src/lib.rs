//! Listing engine: page fetching, extraction, dedup persistence, notification and
//! the polling loop.
mod aggregator;
mod clock;
mod decode;
mod digest;
mod fetch;
mod notify;
mod persist;
mod source;
mod types;
mod watcher;

pub mod extract;

pub use aggregator::{AggregatorSettings, ListingAggregator};
pub use clock::{Clock, SystemClock};
pub use digest::{DigestScheduler, DigestSettings};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use notify::{Notifier, NotifyError, TelegramNotifier, TelegramSettings, TELEGRAM_API_URL};
pub use persist::{ensure_state_dir, AtomicFileWriter, DedupStore, JsonDedupStore, StoreError};
pub use source::{
    default_sources, ListingSource, PageSource, SourceError, BINGX_URL, GATE_IO_URL, MEXC_URL,
};
pub use types::{CycleError, FailureKind, FetchError, FetchedPage};
pub use watcher::{TickReport, Watcher, WatcherSettings};
