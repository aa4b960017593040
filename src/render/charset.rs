//! Charset normalization of leaf content to UTF-8.
//!
//! Conversion failures never surface as errors: the original bytes are
//! returned and rendering carries on with whatever they decode to.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Labels decoded as ISO-8859-1 proper (one byte, one code point).
///
/// WHATWG maps these to windows-1252, which differs on 0x80..=0x9F.
const LATIN1_LABELS: [&str; 9] = [
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso-ir-100",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
    "csisolatin1",
];

/// Convert `content` from its declared charset to UTF-8.
///
/// `charset` falls back to `default_charset` when the part declares none.
/// Content that is already UTF-8 is returned borrowed and unchanged, as is
/// content whose charset is unknown or which does not decode cleanly.
pub fn to_utf8<'a>(content: &'a [u8], charset: Option<&str>, default_charset: &str) -> Cow<'a, [u8]> {
    let label = charset.unwrap_or(default_charset).trim();

    if LATIN1_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        return latin1_to_utf8(content);
    }

    let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
        warn!(charset = label, "Unknown charset, keeping original bytes");
        return Cow::Borrowed(content);
    };

    if encoding == UTF_8 {
        return Cow::Borrowed(content);
    }

    match encoding.decode_without_bom_handling_and_without_replacement(content) {
        Some(Cow::Borrowed(text)) => Cow::Borrowed(text.as_bytes()),
        Some(Cow::Owned(text)) => Cow::Owned(text.into_bytes()),
        None => {
            debug!(
                charset = encoding.name(),
                "Malformed input for charset, keeping original bytes"
            );
            Cow::Borrowed(content)
        }
    }
}

fn latin1_to_utf8(content: &[u8]) -> Cow<'_, [u8]> {
    if content.is_ascii() {
        return Cow::Borrowed(content);
    }
    let text: String = content.iter().map(|&b| char::from(b)).collect();
    Cow::Owned(text.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_unchanged() {
        let input = "café".as_bytes();
        let out = to_utf8(input, Some("UTF-8"), "iso-8859-1");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), input);
    }

    #[test]
    fn test_latin1_is_converted() {
        let out = to_utf8(b"caf\xE9", Some("iso-8859-1"), "utf-8");
        assert_eq!(out.as_ref(), "café".as_bytes());
    }

    #[test]
    fn test_latin1_control_range_is_not_windows_1252() {
        // 0x80 is U+0080 in ISO-8859-1 but '€' in windows-1252
        let latin1 = to_utf8(b"\x80", Some("ISO-8859-1"), "utf-8");
        assert_eq!(latin1.as_ref(), "\u{80}".as_bytes());

        let cp1252 = to_utf8(b"\x80", Some("windows-1252"), "utf-8");
        assert_eq!(cp1252.as_ref(), "€".as_bytes());
    }

    #[test]
    fn test_missing_charset_uses_default() {
        let out = to_utf8(b"na\xEFve", None, "iso-8859-1");
        assert_eq!(out.as_ref(), "naïve".as_bytes());
    }

    #[test]
    fn test_unknown_charset_keeps_bytes() {
        let input = b"caf\xE9";
        let out = to_utf8(input, Some("x-klingon"), "iso-8859-1");
        assert_eq!(out.as_ref(), input);
    }

    #[test]
    fn test_malformed_input_keeps_bytes() {
        // Lone lead byte is invalid Shift_JIS
        let input = b"abc\x81";
        let out = to_utf8(input, Some("shift_jis"), "iso-8859-1");
        assert_eq!(out.as_ref(), input);
    }

    #[test]
    fn test_ascii_stays_borrowed() {
        let out = to_utf8(b"plain ascii", Some("us-ascii"), "iso-8859-1");
        assert!(matches!(out, Cow::Borrowed(_)));
        let out = to_utf8(b"plain ascii", None, "latin1");
        assert!(matches!(out, Cow::Borrowed(_)));
    }
}
