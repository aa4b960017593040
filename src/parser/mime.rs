//! MIME structure: turn raw message bytes into an owned [`Message`] tree.
//!
//! `mail-parser` does the low-level work (boundaries, transfer encodings,
//! declared text charsets). This module maps its flat part list onto the
//! [`Part`] tree the renderer walks.

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, MimeHeaders, PartType};
use tracing::{debug, warn};

use crate::model::message::{Leaf, Message, Multipart, Part, DEFAULT_MEDIA_TYPE};
use crate::parser::header::{find_header_end, parse_date, Headers};
use crate::parser::transfer::decode_body;

/// Maximum nesting of multiparts and embedded messages that is followed.
/// Deeper parts are treated as empty containers.
const MAX_DEPTH: usize = 32;

/// Parses raw message files into [`Message`]s.
///
/// Create one per run and reuse it for every input.
pub struct MimeParser {
    parser: MessageParser,
    archive_header: String,
}

impl MimeParser {
    /// Create a parser that records `archive_header` as the permalink header.
    pub fn new(archive_header: impl Into<String>) -> Self {
        Self {
            parser: MessageParser::default(),
            archive_header: archive_header.into(),
        }
    }

    /// Parse one complete raw message (headers + body).
    ///
    /// Never fails: input `mail-parser` rejects is kept as a single
    /// `text/plain` body.
    pub fn parse(&self, raw_message: &[u8]) -> Message {
        let data = skip_from_line(raw_message);
        let headers = Headers::parse(data);

        match self.parser.parse(data) {
            Some(parsed) => self.convert_message(&parsed, &headers, MAX_DEPTH),
            None => {
                warn!("mail-parser rejected message, using raw body");
                let mut message = self.message_from_headers(&headers, None);
                message.root = Part::Leaf(Leaf::new(
                    DEFAULT_MEDIA_TYPE,
                    None,
                    extract_body_fallback(data),
                ));
                message
            }
        }
    }

    fn message_from_headers(
        &self,
        headers: &Headers,
        parsed: Option<&mail_parser::Message<'_>>,
    ) -> Message {
        let date = parsed
            .and_then(mail_parser_date)
            .or_else(|| headers.get("date").and_then(parse_date));

        Message {
            from: headers.get("from").unwrap_or_default().to_string(),
            date,
            archived_at: headers.get(&self.archive_header).map(str::to_string),
            root: Part::Multipart(Multipart::new(None, Vec::new())),
        }
    }

    fn convert_message(
        &self,
        parsed: &mail_parser::Message<'_>,
        headers: &Headers,
        depth: usize,
    ) -> Message {
        let mut message = self.message_from_headers(headers, Some(parsed));
        message.root = self.convert_part(parsed, 0, depth);
        message
    }

    fn convert_part(&self, parsed: &mail_parser::Message<'_>, id: usize, depth: usize) -> Part {
        let Some(part) = parsed.part(id) else {
            debug!(part = id, "Dangling MIME part id");
            return Part::Multipart(Multipart::new(None, Vec::new()));
        };
        let content_type = part.content_type();

        match &part.body {
            // mail-parser transcodes declared charsets to UTF-8. Without a
            // declaration it guesses UTF-8, so keep the raw bytes instead and
            // let the renderer apply the configured default.
            PartType::Text(text) | PartType::Html(text) => {
                let media_type = media_type(content_type);
                if content_type.and_then(|ct| ct.attribute("charset")).is_some() {
                    Part::Leaf(Leaf::new(&media_type, Some("utf-8"), text.as_bytes().to_vec()))
                } else {
                    Part::Leaf(Leaf::new(&media_type, None, raw_body(parsed, part)))
                }
            }
            PartType::Binary(bytes) | PartType::InlineBinary(bytes) => Part::Leaf(Leaf::new(
                &media_type(content_type),
                content_type.and_then(|ct| ct.attribute("charset")),
                bytes.to_vec(),
            )),
            PartType::Message(nested) => {
                if depth == 0 {
                    warn!("Embedded messages nested too deeply, skipping");
                    return Part::Multipart(Multipart::new(None, Vec::new()));
                }
                let nested_headers = nested_headers(nested);
                Part::Message(Box::new(self.convert_message(
                    nested,
                    &nested_headers,
                    depth - 1,
                )))
            }
            PartType::Multipart(ids) => {
                let subtype = content_type.and_then(|ct| ct.subtype());
                if depth == 0 {
                    warn!("Multiparts nested too deeply, skipping");
                    return Part::Multipart(Multipart::new(subtype, Vec::new()));
                }
                let children = ids
                    .iter()
                    .map(|&child| self.convert_part(parsed, child, depth - 1))
                    .collect();
                Part::Multipart(Multipart::new(subtype, children))
            }
        }
    }
}

/// `type/subtype` of a part, or the plain-text default when undeclared.
fn media_type(content_type: Option<&mail_parser::ContentType<'_>>) -> String {
    content_type
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{sub}", ct.ctype()),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string())
}

/// Header block of an embedded message.
///
/// Part offsets index into the nested message's raw buffer, which may be
/// the enclosing message's, so start from the root part's header offset.
fn nested_headers(nested: &mail_parser::Message<'_>) -> Headers {
    let start = nested.part(0).map_or(0, |root| root.raw_header_offset());
    Headers::parse(nested.raw_message().get(start..).unwrap_or_default())
}

/// Body bytes of `part` with only the transfer encoding removed.
fn raw_body(parsed: &mail_parser::Message<'_>, part: &mail_parser::MessagePart<'_>) -> Vec<u8> {
    let body = parsed
        .raw_message()
        .get(part.raw_body_offset()..part.raw_end_offset())
        .unwrap_or_default();
    decode_body(body, part.content_transfer_encoding())
}

/// The `Date:` header as understood by `mail-parser`.
fn mail_parser_date(parsed: &mail_parser::Message<'_>) -> Option<DateTime<Utc>> {
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Skip a UTF-8 BOM and the `From ` separator line of single-message mbox files.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Everything after the first blank line.
fn extract_body_fallback(data: &[u8]) -> Vec<u8> {
    match find_header_end(data) {
        Some(end) => {
            let rest = &data[end..];
            let skip = if rest.starts_with(b"\r\n\r\n") {
                4
            } else if rest.starts_with(b"\n\n") {
                2
            } else {
                // Blank line at the very start
                rest.iter().position(|&b| b == b'\n').map_or(rest.len(), |p| p + 1)
            };
            rest[skip..].to_vec()
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Message {
        MimeParser::new("Archived-At").parse(raw.as_bytes())
    }

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
    }

    #[test]
    fn test_skip_bom_and_from_line() {
        let data = b"\xEF\xBB\xBFFrom x Thu Jan 01 00:00:00 2024\nFrom: a@b.com\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"From: a@b.com"));
    }

    #[test]
    fn test_skip_from_line_no_from() {
        let data = b"Subject: Test\n\nBody\n";
        assert_eq!(skip_from_line(data), data);
    }

    #[test]
    fn test_extract_body_fallback() {
        assert_eq!(extract_body_fallback(b"A: b\n\nBody\n"), b"Body\n");
        assert_eq!(extract_body_fallback(b"A: b\r\n\r\nBody"), b"Body");
        assert!(extract_body_fallback(b"A: b\n").is_empty());
    }

    #[test]
    fn test_simple_message() {
        let msg = parse(
            "From: Alice <alice@example.com>\n\
             Date: Thu, 04 Jan 2024 10:00:00 +0100\n\
             Subject: Hi\n\
             \n\
             Hello there\n",
        );
        assert_eq!(msg.from, "Alice <alice@example.com>");
        assert_eq!(
            msg.date.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-04 09:00:00"
        );
        assert!(msg.archived_at.is_none());
        match &msg.root {
            Part::Leaf(leaf) => {
                assert_eq!(leaf.media_type, "text/plain");
                assert!(String::from_utf8_lossy(&leaf.content).contains("Hello there"));
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_archive_header_is_recorded() {
        let msg = parse(
            "From: a@example.com\n\
             Archived-At: <https://example.org/1>\n\
             \n\
             Body\n",
        );
        assert_eq!(msg.archived_at.as_deref(), Some("<https://example.org/1>"));
    }

    #[test]
    fn test_alternative_structure() {
        let msg = parse(
            "From: a@example.com\n\
             MIME-Version: 1.0\n\
             Content-Type: multipart/alternative; boundary=\"XX\"\n\
             \n\
             --XX\n\
             Content-Type: text/plain; charset=us-ascii\n\
             \n\
             plain body\n\
             --XX\n\
             Content-Type: text/html; charset=us-ascii\n\
             \n\
             <p>html body</p>\n\
             --XX--\n",
        );
        let Part::Multipart(mp) = &msg.root else {
            panic!("expected multipart, got {:?}", msg.root);
        };
        assert_eq!(mp.subtype, "alternative");
        assert_eq!(mp.children.len(), 2);
        let Part::Leaf(html) = &mp.children[1] else {
            panic!("expected leaf");
        };
        assert_eq!(html.media_type, "text/html");
    }

    fn root_leaf(msg: &Message) -> &Leaf {
        match &msg.root {
            Part::Leaf(leaf) => leaf,
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_charset_keeps_raw_bytes() {
        let parser = MimeParser::new("Archived-At");
        let msg = parser.parse(b"From: a@example.com\nContent-Type: text/plain\n\ncaf\xE9 au lait\n");
        let leaf = root_leaf(&msg);
        assert!(leaf.charset.is_none());
        assert!(leaf.content.starts_with(b"caf\xE9 au lait"));

        let msg = parser.parse(b"From: a@example.com\n\ncaf\xE9 au lait\n");
        let leaf = root_leaf(&msg);
        assert!(leaf.charset.is_none());
        assert!(leaf.content.starts_with(b"caf\xE9 au lait"));
    }

    #[test]
    fn test_undeclared_charset_removes_transfer_encoding() {
        let msg = MimeParser::new("Archived-At").parse(
            b"From: a@example.com\n\
              Content-Type: text/plain\n\
              Content-Transfer-Encoding: quoted-printable\n\
              \n\
              caf=E9 cr=\n\
              =E8me\n",
        );
        assert!(root_leaf(&msg).content.starts_with(b"caf\xE9 cr\xE8me"));
    }

    #[test]
    fn test_declared_charset_is_transcoded() {
        let msg = MimeParser::new("Archived-At").parse(
            b"From: a@example.com\nContent-Type: text/plain; charset=iso-8859-1\n\ncaf\xE9\n",
        );
        let leaf = root_leaf(&msg);
        assert_eq!(leaf.charset.as_deref(), Some("utf-8"));
        assert!(leaf.content.starts_with("café".as_bytes()));
    }

    #[test]
    fn test_forwarded_message_keeps_its_own_headers() {
        let msg = parse(
            "From: Carol <carol@example.com>\n\
             MIME-Version: 1.0\n\
             Content-Type: multipart/mixed; boundary=\"outer\"\n\
             \n\
             --outer\n\
             Content-Type: message/rfc822\n\
             \n\
             From: Dave <dave@example.com>\n\
             Date: Wed, 03 Jan 2024 09:00:00 +0000\n\
             \n\
             Original forwarded text.\n\
             --outer--\n",
        );
        assert_eq!(msg.from, "Carol <carol@example.com>");
        let Part::Multipart(mp) = &msg.root else {
            panic!("expected multipart, got {:?}", msg.root);
        };
        let Part::Message(inner) = &mp.children[0] else {
            panic!("expected embedded message, got {:?}", mp.children[0]);
        };
        assert_eq!(inner.from, "Dave <dave@example.com>");
        let Part::Leaf(leaf) = &inner.root else {
            panic!("expected leaf, got {:?}", inner.root);
        };
        assert!(leaf.content.starts_with(b"Original forwarded text."));
    }

    #[test]
    fn test_nested_message() {
        let msg = parse(
            "From: outer@example.com\n\
             MIME-Version: 1.0\n\
             Content-Type: message/rfc822\n\
             \n\
             From: inner@example.com\n\
             Subject: Inner\n\
             \n\
             Inner body\n",
        );
        let Part::Message(inner) = &msg.root else {
            panic!("expected embedded message, got {:?}", msg.root);
        };
        assert_eq!(inner.from, "inner@example.com");
    }
}
