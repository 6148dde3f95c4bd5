//! HTML escaping helpers
//!
//! Escaping happens only at render time; the document model stores text
//! verbatim.

/// Escape text content: `&`, `<`, `>` and `"`
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value
pub fn escape_attr(value: &str, out: &mut String) {
    escape_text(value, out);
}

/// Escape a URL for an `href`/`src` attribute.
///
/// URL delimiters (`/ ? # : = %` ...) pass through. Whitespace, control and
/// non-ASCII bytes are percent-encoded, and attribute metacharacters are
/// entity-escaped.
pub fn escape_url(url: &str, out: &mut String) {
    for c in url.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if c.is_ascii_graphic() => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push('%');
                    out.push(hex_digit(byte >> 4));
                    out.push(hex_digit(byte & 0x0f));
                }
            }
        }
    }
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16)
        .unwrap_or('0')
        .to_ascii_uppercase()
}
