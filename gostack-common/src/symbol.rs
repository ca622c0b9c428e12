//! Decoding of compiler escapes in Go symbol names.

use std::borrow::Cow;

/// Decodes the `%xx` escapes the Go compiler embeds in symbol names.
///
/// Characters that are not valid in object file symbols, like `·` in
/// autogenerated function names, are percent-encoded by the compiler. The
/// decoded form is only suitable for display; matching against other symbol
/// references must use the raw form.
///
/// Invalid escapes are passed through verbatim. Escaped byte sequences that
/// do not form valid UTF-8 are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use gostack_common::decode_escapes;
///
/// assert_eq!(decode_escapes("main.func%c2%b7001"), "main.func·001");
/// assert_eq!(decode_escapes("main.main"), "main.main");
/// ```
pub fn decode_escapes(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            decoded.push(b);
            continue;
        }
        let mut pair = bytes.clone();
        match (pair.next().and_then(hex_digit), pair.next().and_then(hex_digit)) {
            (Some(hi), Some(lo)) => {
                decoded.push(hi << 4 | lo);
                bytes = pair;
            }
            _ => decoded.push(b'%'),
        }
    }

    match String::from_utf8(decoded) {
        Ok(s) => Cow::Owned(s),
        Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

#[inline]
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_no_escapes_borrows() {
        assert!(matches!(decode_escapes("main.main"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(decode_escapes("a%2eb"), "a.b");
        assert_eq!(decode_escapes("a%2Fb"), "a/b");
    }

    #[test]
    fn test_multi_byte() {
        assert_eq!(decode_escapes("main.func%c2%b7006"), "main.func·006");
    }

    #[test]
    fn test_invalid_escape_passes_through() {
        assert_eq!(decode_escapes("50%"), "50%");
        assert_eq!(decode_escapes("a%zzb"), "a%zzb");
        assert_eq!(decode_escapes("a%2"), "a%2");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(decode_escapes("a%ffb"), "a\u{fffd}b");
    }
}
