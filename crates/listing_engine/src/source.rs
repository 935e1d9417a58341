use std::sync::Arc;

use engine_logging::engine_debug;
use listing_core::Listing;
use thiserror::Error;

use crate::extract::{
    BingxExtractor, ExtractContext, ExtractError, GateExtractor, ListingExtractor, MexcExtractor,
};
use crate::{FetchError, Fetcher};

pub const MEXC_URL: &str = "https://www.mexc.com/support/articles/530000033958";
pub const GATE_IO_URL: &str = "https://www.gate.io/news";
pub const BINGX_URL: &str =
    "https://bingx.zendesk.com/hc/en-001/sections/18530471187725-New-Listing-Announcements";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

/// One exchange feed. Failures stay inside the source; the aggregator logs them and
/// treats the source as having found nothing.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    fn name(&self) -> &str;
    async fn collect(&self, ctx: &ExtractContext) -> Result<Vec<Listing>, SourceError>;
}

/// Fetches a fixed announcement page and runs an extractor over it.
pub struct PageSource {
    url: String,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn ListingExtractor>,
}

impl PageSource {
    pub fn new(
        url: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Box<dyn ListingExtractor>,
    ) -> Self {
        Self {
            url: url.into(),
            fetcher,
            extractor,
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for PageSource {
    fn name(&self) -> &str {
        self.extractor.exchange()
    }

    async fn collect(&self, ctx: &ExtractContext) -> Result<Vec<Listing>, SourceError> {
        engine_debug!("Fetching {} announcements from {}", self.name(), self.url);
        let page = self.fetcher.fetch(&self.url).await?;
        Ok(self.extractor.extract(&page.html, ctx)?)
    }
}

/// The exchanges watched by default, in notification order.
pub fn default_sources(fetcher: Arc<dyn Fetcher>) -> Vec<Box<dyn ListingSource>> {
    vec![
        Box::new(PageSource::new(MEXC_URL, fetcher.clone(), Box::new(MexcExtractor))),
        Box::new(PageSource::new(GATE_IO_URL, fetcher.clone(), Box::new(GateExtractor))),
        Box::new(PageSource::new(BINGX_URL, fetcher, Box::new(BingxExtractor))),
    ]
}
