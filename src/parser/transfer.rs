//! Content-Transfer-Encoding removal for raw body bytes (RFC 2045 §6).

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

/// Standard alphabet with optional padding, as found in real mail.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode `body` according to its `Content-Transfer-Encoding`.
///
/// `7bit`, `8bit`, `binary`, a missing header and unknown encodings pass
/// the bytes through. Base64 that fails to decode is also passed through.
pub fn decode_body(body: &[u8], encoding: Option<&str>) -> Vec<u8> {
    let encoding = encoding.map(str::trim).unwrap_or_default();

    if encoding.eq_ignore_ascii_case("base64") {
        decode_base64(body).unwrap_or_else(|| {
            debug!("Invalid base64 body, keeping raw bytes");
            body.to_vec()
        })
    } else if encoding.eq_ignore_ascii_case("quoted-printable") {
        decode_quoted_printable(body)
    } else {
        body.to_vec()
    }
}

/// Decode base64, ignoring whitespace and line breaks.
pub fn decode_base64(data: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64.decode(compact).ok()
}

/// Decode quoted-printable. Soft line breaks are removed and malformed
/// `=` escapes are kept literally.
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'=' {
            out.push(data[i]);
            i += 1;
            continue;
        }

        let rest = &data[i + 1..];
        if rest.starts_with(b"\r\n") {
            i += 3;
        } else if rest.starts_with(b"\n") {
            i += 2;
        } else if let Some(byte) = rest.get(..2).and_then(hex_byte) {
            out.push(byte);
            i += 3;
        } else {
            out.push(b'=');
            i += 1;
        }
    }
    out
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let hex = std::str::from_utf8(pair).ok()?;
    u8::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_printable() {
        assert_eq!(decode_quoted_printable(b"caf=E9 cr=E8me"), b"caf\xE9 cr\xE8me");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable(b"long=\nline=\r\nend"), b"longlineend");
    }

    #[test]
    fn test_quoted_printable_malformed_escape_kept() {
        assert_eq!(decode_quoted_printable(b"a=ZZb="), b"a=ZZb=");
    }

    #[test]
    fn test_base64_with_line_breaks() {
        assert_eq!(decode_base64(b"SGVsbG8s\r\nIHdvcmxk\n").unwrap(), b"Hello, world");
    }

    #[test]
    fn test_base64_missing_padding() {
        assert_eq!(decode_base64(b"SGk").unwrap(), b"Hi");
    }

    #[test]
    fn test_decode_body_dispatch() {
        assert_eq!(decode_body(b"Y2Fm6Q==", Some("Base64")), b"caf\xE9");
        assert_eq!(decode_body(b"caf=E9", Some(" quoted-printable ")), b"caf\xE9");
        assert_eq!(decode_body(b"caf=E9", Some("8bit")), b"caf=E9");
        assert_eq!(decode_body(b"caf=E9", None), b"caf=E9");
        assert_eq!(decode_body(b"!!not base64!!", Some("base64")), b"!!not base64!!");
    }
}
