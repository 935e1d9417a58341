//! Telegram HTML message bodies.

use crate::{DigestDay, Listing};

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn format_alert(listing: &Listing) -> String {
    let mut lines = vec![
        "🔔 <b>NEW LISTING!</b>".to_string(),
        String::new(),
        format!("📅 {}", escape_html(&listing.date)),
        format!("🏦 {}", escape_html(&listing.exchange)),
        format!("🪙 ${}", escape_html(&listing.coin)),
    ];
    if let Some(spot) = &listing.spot_time {
        lines.push(format!("🟢 Spot {}", escape_html(spot)));
    }
    if let Some(futures) = &listing.futures_time {
        lines.push(format!("🔵 Futures {}", escape_html(futures)));
    }
    lines.push(format!(
        "🔗 <a href=\"{}\">Announcement</a>",
        escape_html(&listing.link)
    ));
    lines.join("\n")
}

pub fn format_digest_day(day: &DigestDay) -> String {
    let mut msg = format!(
        "🌅 <b>UPCOMING LISTINGS</b>\n\n📅 <b>{}</b>\n",
        escape_html(&day.date)
    );
    for entry in &day.entries {
        msg.push_str(&format!(
            "🏦 {}\n🪙 ${}\n\n",
            escape_html(&entry.exchange),
            escape_html(&entry.coin)
        ));
    }
    msg.trim_end().to_string()
}

pub fn format_empty_digest() -> String {
    "📭 <b>No new listings for today or tomorrow</b>".to_string()
}
