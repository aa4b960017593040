//! Sender address parsing (RFC 5322 §3.4).

use crate::parser::header::decode_encoded_words;

/// A parsed email address.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `display_name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `display_name = ""`, `address = "user@example.com"`
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAddress {
    /// Human-readable display name, RFC 2047 encoded-words resolved (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`).
    pub address: String,
}

impl EmailAddress {
    /// Parse the first address of a raw header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    /// - `"=?UTF-8?B?...?= <user@domain.com>"`
    ///
    /// The display name is decoded after the address is split off, so an
    /// encoded-word that decodes to `<` or `,` cannot confuse the split.
    pub fn parse(raw: &str) -> Self {
        let trimmed = first_mailbox(raw.trim());
        if trimmed.is_empty() {
            return Self {
                display_name: String::new(),
                address: String::new(),
            };
        }

        // Try "Display Name <address>" or "<address>"
        if let Some(angle_start) = trimmed.rfind('<') {
            if let Some(angle_end) = trimmed.rfind('>') {
                if angle_end > angle_start {
                    let addr = trimmed[angle_start + 1..angle_end].trim().to_string();
                    let name_part = strip_quotes(&trimmed[..angle_start]);
                    return Self {
                        display_name: decode_encoded_words(&name_part).trim().to_string(),
                        address: addr,
                    };
                }
            }
        }

        // Old-style "user@domain.com (Display Name)"
        if let (Some(open), Some(close)) = (trimmed.find('('), trimmed.rfind(')')) {
            if close > open {
                let comment = trimmed[open + 1..close].trim();
                return Self {
                    display_name: decode_encoded_words(comment).trim().to_string(),
                    address: trimmed[..open].trim().to_string(),
                };
            }
        }

        Self {
            display_name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// The text shown for this sender: the display name if there is one,
    /// otherwise the bare address.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.address
        } else {
            &self.display_name
        }
    }
}

/// Cut a header value at the first comma outside quotes and angle brackets.
fn first_mailbox(raw: &str) -> &str {
    let mut in_quotes = false;
    let mut in_angle = false;

    for (i, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => return raw[..i].trim(),
            _ => {}
        }
    }
    raw
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
