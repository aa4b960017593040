//! Message rendering: one parsed message → one digest entry.
//!
//! An entry looks like:
//!
//! ```text
//! <div class=article>
//! <span class=from>Alice</span>
//! <span class=date>2024-01-04 09:00:00</span>
//! <div class=body>Hello...
//! </div>
//! <a href="https://example.org/msg/1">Read more</a>
//! </div>
//! ```

use chrono::{DateTime, Utc};

use crate::config::RenderConfig;
use crate::model::address::EmailAddress;
use crate::model::message::{Leaf, Message};
use crate::parser::header::clean_archive_url;
use crate::render::charset;
use crate::render::select::select_leaf;
use crate::render::text::{escape_attr, escape_html, render_body, RenderMode, Teaser};

/// Format used for the date span. Always UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `message` as an HTML fragment.
///
/// Messages carrying an archive link become teasers: the body is cut to
/// an excerpt and a "Read more" link is appended. Others are shown in full.
/// A message without renderable content still gets its sender and date.
pub fn render_message(message: &Message, config: &RenderConfig) -> String {
    let teaser = message
        .archived_at
        .as_ref()
        .map(|_| Teaser::from_config(config));

    let mut out = String::new();
    out.push_str("<div class=article>\n");
    out.push_str(&format!(
        "<span class=from>{}</span>\n",
        escape_html(&sender_label(&message.from))
    ));
    out.push_str(&format!(
        "<span class=date>{}</span>\n",
        format_date(message.date)
    ));

    if let Some(leaf) = select_leaf(&message.root) {
        out.push_str(&render_leaf(leaf, teaser.as_ref(), config));
    }

    if let Some(raw) = &message.archived_at {
        out.push_str(&format!(
            "<a href=\"{}\">Read more</a>\n",
            escape_attr(clean_archive_url(raw))
        ));
    }
    out.push_str("</div>\n");
    out
}

/// Render one leaf's content as a body container.
pub fn render_leaf(leaf: &Leaf, teaser: Option<&Teaser>, config: &RenderConfig) -> String {
    let content = charset::to_utf8(&leaf.content, leaf.charset.as_deref(), &config.default_charset);
    let text = String::from_utf8_lossy(&content);
    render_body(&text, RenderMode::for_media_type(&leaf.media_type), teaser)
}

/// The decoded display name of a `From:` value, or the raw value when it has none.
pub fn sender_label(raw_from: &str) -> String {
    let address = EmailAddress::parse(raw_from);
    if address.display_name.is_empty() {
        raw_from.trim().to_string()
    } else {
        address.display_name
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC. A missing date shows the Unix epoch.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.unwrap_or(DateTime::UNIX_EPOCH)
        .format(DATE_FORMAT)
        .to_string()
}
