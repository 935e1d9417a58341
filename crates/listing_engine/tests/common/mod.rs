#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use listing_core::{Listing, SeenListings};
use listing_engine::extract::ExtractContext;
use listing_engine::{
    Clock, DedupStore, FailureKind, FetchError, ListingSource, Notifier, NotifyError, SourceError,
    StoreError,
};

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Listing as an extractor would produce it.
pub fn listing(exchange: &str, coin: &str, date: &str) -> Listing {
    Listing {
        exchange: exchange.to_string(),
        coin: coin.to_string(),
        title: format!("New listing ${coin} spot"),
        link: format!("https://example.com/{coin}"),
        spot_time: Some("12:00 UTC".to_string()),
        futures_time: None,
        date: date.to_string(),
    }
}

pub struct StaticSource {
    name: String,
    listings: Vec<Listing>,
    keep_date: bool,
}

impl StaticSource {
    /// Returns `listings` verbatim every cycle.
    pub fn fixed(name: &str, listings: Vec<Listing>) -> Self {
        Self {
            name: name.to_string(),
            listings,
            keep_date: true,
        }
    }

    /// Returns `listings` restamped with the cycle date.
    pub fn dated(name: &str, listings: Vec<Listing>) -> Self {
        Self {
            keep_date: false,
            ..Self::fixed(name, listings)
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self, ctx: &ExtractContext) -> Result<Vec<Listing>, SourceError> {
        let mut listings = self.listings.clone();
        if !self.keep_date {
            for listing in &mut listings {
                listing.date = ctx.date.clone();
            }
        }
        Ok(listings)
    }
}

pub struct FailingSource;

#[async_trait::async_trait]
impl ListingSource for FailingSource {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn collect(&self, _ctx: &ExtractContext) -> Result<Vec<Listing>, SourceError> {
        Err(SourceError::Fetch(FetchError {
            kind: FailureKind::Timeout,
            message: "operation timed out".to_string(),
        }))
    }
}

/// Panics on its first call only.
#[derive(Default)]
pub struct PanicOnceSource {
    panicked: AtomicBool,
}

#[async_trait::async_trait]
impl ListingSource for PanicOnceSource {
    fn name(&self) -> &str {
        "Flaky"
    }

    async fn collect(&self, _ctx: &ExtractContext) -> Result<Vec<Listing>, SourceError> {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("extractor bug");
        }
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail_all: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail_all.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(NotifyError::Status {
                status: 400,
                body: "Bad Request: chat not found".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory dedup store with injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<String>>,
    failing_loads: AtomicUsize,
    fail_saves: AtomicBool,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with_entries(entries: &[&str]) -> Self {
        let store = Self::default();
        *store.entries.lock().unwrap() = entries.iter().map(|e| e.to_string()).collect();
        store
    }

    pub fn fail_next_loads(&self, count: usize) {
        self.failing_loads.store(count, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn injected(&self) -> StoreError {
        StoreError::Io {
            path: PathBuf::from("memory"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "injected failure"),
        }
    }
}

impl DedupStore for MemoryStore {
    fn load(&self) -> Result<SeenListings, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(self.injected());
        }
        Ok(SeenListings::from_entries(self.entries()))
    }

    fn save(&self, seen: &SeenListings) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(self.injected());
        }
        *self.entries.lock().unwrap() = seen.entries().to_vec();
        Ok(())
    }
}

/// Clock set explicitly by the test.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Wall clock driven by tokio's (possibly paused) timer.
pub struct TokioClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.start;
        self.base + chrono::Duration::from_std(elapsed).unwrap()
    }
}
