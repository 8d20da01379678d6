//! Escaping for IRCv3 tag values.
//!
//! Tag values travel inside the space-delimited head of a line, so the
//! characters that would break framing are carried as two-byte escapes:
//! `\:` for `;`, `\s` for space, `\\`, `\r`, and `\n`. Decoding applies
//! the table exactly once; a backslash before any other character simply
//! drops out, and a backslash at the end of the value vanishes.

/// Encode a tag value for the wire.
pub fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => out.push_str("\\:"),
            ' ' => out.push_str("\\s"),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode a tag value from the wire.
///
/// Inverse of [`escape_tag_value`] for values it produces; arbitrary
/// input is handled by the unknown-escape and trailing-backslash rules
/// above.
pub fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let mut tail = rest[pos + 1..].chars();
        if let Some(escaped) = tail.next() {
            out.push(match escaped {
                ':' => ';',
                's' => ' ',
                'r' => '\r',
                'n' => '\n',
                // `\\` maps to itself here, and so does any unknown
                // escape: the backslash is gone either way.
                other => other,
            });
        }
        rest = tail.as_str();
    }
    out.push_str(rest);
    out
}
