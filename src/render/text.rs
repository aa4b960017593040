//! Text rendering: HTML escaping, tag stripping, and teaser truncation.

use crate::config::RenderConfig;

/// How a leaf's text is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Text copied verbatim with `<`, `>` and `&` escaped.
    Plain,
    /// Markup with all tags stripped; the remaining text is emitted as-is.
    Html,
}

impl RenderMode {
    /// `Html` for `text/html`, `Plain` for every other media type.
    pub fn for_media_type(media_type: &str) -> Self {
        if media_type.eq_ignore_ascii_case("text/html") {
            Self::Html
        } else {
            Self::Plain
        }
    }
}

/// Teaser parameters: where an excerpt may end and what marks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Teaser {
    /// Characters always emitted before looking for a word boundary.
    pub length: usize,
    /// Extra characters scanned for a space before cutting anyway.
    pub search_limit: Option<usize>,
    /// Appended after the excerpt.
    pub ellipsis: String,
}

impl Teaser {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            length: config.teaser_length,
            search_limit: config.boundary_search_limit,
            ellipsis: config.ellipsis.clone(),
        }
    }
}

impl Default for Teaser {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

/// Escape the three HTML special characters `<`, `>` and `&`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

/// Remove every `<...>` tag. An unterminated tag swallows the rest of the input.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// The prefix of `text` a teaser shows.
///
/// The first `teaser.length` characters are always kept. After that the
/// excerpt runs on to the next space (excluded), so no word is cut in
/// half. With a `search_limit` the run-on stops after that many extra
/// characters even without a space.
pub fn excerpt<'a>(text: &'a str, teaser: &Teaser) -> &'a str {
    for (count, (idx, ch)) in text.char_indices().enumerate() {
        if count < teaser.length {
            continue;
        }
        if ch == ' ' {
            return &text[..idx];
        }
        if let Some(limit) = teaser.search_limit {
            if count >= teaser.length + limit {
                return &text[..idx];
            }
        }
    }
    text
}

/// Render decoded leaf text as a body container.
///
/// With a `teaser` the text is cut by [`excerpt`] and the ellipsis is
/// appended; without one the whole text is emitted.
pub fn render_body(text: &str, mode: RenderMode, teaser: Option<&Teaser>) -> String {
    let visible = match mode {
        RenderMode::Plain => text.to_string(),
        RenderMode::Html => strip_tags(text),
    };
    let shown = match teaser {
        Some(teaser) => excerpt(&visible, teaser),
        None => visible.as_str(),
    };

    let mut out = String::with_capacity(shown.len() + 32);
    out.push_str("<div class=body>");
    match mode {
        RenderMode::Plain => out.push_str(&escape_html(shown)),
        RenderMode::Html => out.push_str(shown),
    }
    if let Some(teaser) = teaser {
        out.push_str(&teaser.ellipsis);
        out.push('\n');
    }
    out.push_str("</div>\n");
    out
}
