//! Parsed message and its MIME part tree.
//!
//! A [`Message`] owns its whole [`Part`] tree. Nothing is shared between
//! messages; the tree is dropped together with the message once its
//! digest entry has been rendered.

use chrono::{DateTime, Utc};

/// Media type assumed when a part has no usable `Content-Type`.
pub const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// One parsed email.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Raw `From:` header value (unfolded, possibly RFC 2047 encoded).
    pub from: String,

    /// Parsed `Date:` header, normalized to UTC. `None` when absent or unparseable.
    pub date: Option<DateTime<Utc>>,

    /// Raw value of the archive/permalink header, if the message carries one.
    pub archived_at: Option<String>,

    /// Root of the MIME structure.
    pub root: Part,
}

/// A node in the MIME tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// A single body with content.
    Leaf(Leaf),
    /// A container of ordered child parts.
    Multipart(Multipart),
    /// An embedded `message/rfc822`.
    Message(Box<Message>),
}

/// A non-container MIME part.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Lowercase `type/subtype`, e.g. `"text/html"`.
    pub media_type: String,

    /// Charset of `content`, if declared.
    pub charset: Option<String>,

    /// Content with the transfer encoding already removed.
    pub content: Vec<u8>,
}

/// A `multipart/*` container.
#[derive(Debug, Clone, PartialEq)]
pub struct Multipart {
    /// Lowercase subtype, e.g. `"alternative"`. Defaults to `"mixed"`.
    pub subtype: String,

    /// Child parts in document order.
    pub children: Vec<Part>,
}

impl Leaf {
    /// Build a leaf, normalizing the media type to lowercase.
    pub fn new(media_type: &str, charset: Option<&str>, content: impl Into<Vec<u8>>) -> Self {
        let media_type = media_type.trim();
        Self {
            media_type: if media_type.is_empty() {
                DEFAULT_MEDIA_TYPE.to_string()
            } else {
                media_type.to_ascii_lowercase()
            },
            charset: charset.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            content: content.into(),
        }
    }
}

impl Multipart {
    /// Build a container, lowercasing the subtype and defaulting it to `mixed`.
    pub fn new(subtype: Option<&str>, children: Vec<Part>) -> Self {
        let subtype = subtype
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "mixed".to_string());
        Self { subtype, children }
    }
}

impl Part {
    /// Whether this part is a container (`multipart/*` or an embedded message).
    pub fn is_container(&self) -> bool {
        matches!(self, Part::Multipart(_) | Part::Message(_))
    }
}

impl Message {
    /// A message with only a body, no headers.
    pub fn with_root(root: Part) -> Self {
        Self {
            from: String::new(),
            date: None,
            archived_at: None,
            root,
        }
    }
}
