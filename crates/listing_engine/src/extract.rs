//! Per-exchange listing extraction from announcement page markup.
//!
//! Every heuristic here is keyword matching on element text. It is expected to miss
//! announcements and to produce false positives when an exchange changes its markup.

use listing_core::Listing;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

pub const MEXC: &str = "MEXC";
pub const GATE_IO: &str = "Gate.io";
pub const BINGX: &str = "BingX";

const SPOT_TIME: &str = "12:00 UTC";
const FUTURES_TIME: &str = "12:10 UTC";
const TITLE_FALLBACK_CHARS: usize = 8;

/// Per-cycle values shared by all extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractContext {
    /// Date stamped on every listing found this cycle.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("invalid selector {0:?}")]
    InvalidSelector(&'static str),
    #[error("missing {field} for {title:?}")]
    MissingField { field: &'static str, title: String },
}

pub trait ListingExtractor: Send + Sync {
    fn exchange(&self) -> &str;
    fn extract(&self, html: &str, ctx: &ExtractContext) -> Result<Vec<Listing>, ExtractError>;
}

/// Symbol after the first `$` in the title, else the first characters of the title.
pub fn coin_symbol(title: &str) -> String {
    title
        .split_once('$')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| title.chars().take(TITLE_FALLBACK_CHARS).collect())
}

/// Resolve `href` against `base`, falling back to plain concatenation.
pub fn resolve_link(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("{base}{href}"))
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector(css))
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn enclosing_href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
        .and_then(|anchor| anchor.value().attr("href"))
}

fn is_new_listing(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("listing") && lower.contains("new")
}

struct Found {
    title: String,
    link: String,
    spot_time: Option<String>,
    futures_time: Option<String>,
}

fn into_listing(exchange: &str, found: Found, ctx: &ExtractContext) -> Listing {
    Listing {
        exchange: exchange.to_string(),
        coin: coin_symbol(&found.title),
        title: found.title,
        link: found.link,
        spot_time: found.spot_time,
        futures_time: found.futures_time,
        date: ctx.date.clone(),
    }
}

/// MEXC support article: any link whose text mentions a new listing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MexcExtractor;

impl MexcExtractor {
    const BASE_URL: &'static str = "https://www.mexc.com";
}

impl ListingExtractor for MexcExtractor {
    fn exchange(&self) -> &str {
        MEXC
    }

    fn extract(&self, html: &str, ctx: &ExtractContext) -> Result<Vec<Listing>, ExtractError> {
        let doc = Html::parse_document(html);
        let anchors = selector("a[href]")?;
        let listings = doc
            .select(&anchors)
            .filter_map(|anchor| {
                let title = element_text(&anchor);
                if !is_new_listing(&title) {
                    return None;
                }
                let href = anchor.value().attr("href")?;
                Some(Found {
                    link: resolve_link(Self::BASE_URL, href),
                    title,
                    spot_time: Some(SPOT_TIME.to_string()),
                    futures_time: Some(FUTURES_TIME.to_string()),
                })
            })
            .map(|found| into_listing(MEXC, found, ctx))
            .collect();
        Ok(listings)
    }
}

/// Gate.io news feed: `<h4>` headlines wrapped in their article link.
#[derive(Debug, Default, Clone, Copy)]
pub struct GateExtractor;

impl GateExtractor {
    const BASE_URL: &'static str = "https://www.gate.io";
}

impl ListingExtractor for GateExtractor {
    fn exchange(&self) -> &str {
        GATE_IO
    }

    fn extract(&self, html: &str, ctx: &ExtractContext) -> Result<Vec<Listing>, ExtractError> {
        let doc = Html::parse_document(html);
        let headings = selector("h4")?;
        let mut listings = Vec::new();
        for heading in doc.select(&headings) {
            let title = element_text(&heading);
            if !is_new_listing(&title) {
                continue;
            }
            // A headline without its link means the page layout changed.
            let Some(href) = enclosing_href(&heading) else {
                return Err(ExtractError::MissingField {
                    field: "enclosing link",
                    title,
                });
            };
            let found = Found {
                link: resolve_link(Self::BASE_URL, href),
                title,
                spot_time: Some(SPOT_TIME.to_string()),
                futures_time: None,
            };
            listings.push(into_listing(GATE_IO, found, ctx));
        }
        Ok(listings)
    }
}

/// BingX help-center section: `<h3>` article titles. Unlike Gate.io a headline without
/// a usable link is still reported, linked to `#`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BingxExtractor;

impl ListingExtractor for BingxExtractor {
    fn exchange(&self) -> &str {
        BINGX
    }

    fn extract(&self, html: &str, ctx: &ExtractContext) -> Result<Vec<Listing>, ExtractError> {
        let doc = Html::parse_document(html);
        let headings = selector("h3")?;
        let listings = doc
            .select(&headings)
            .filter_map(|heading| {
                let title = element_text(&heading);
                let lower = title.to_lowercase();
                if !lower.contains("listing") {
                    return None;
                }
                Some(Found {
                    link: enclosing_href(&heading).unwrap_or("#").to_string(),
                    spot_time: lower.contains("spot").then(|| SPOT_TIME.to_string()),
                    futures_time: lower.contains("futures").then(|| FUTURES_TIME.to_string()),
                    title,
                })
            })
            .map(|found| into_listing(BINGX, found, ctx))
            .collect();
        Ok(listings)
    }
}
