//! Reversible mapping between note ids and file names.
//!
//! ASCII letters, digits, `-` and `_` are kept as is; every other UTF-8 byte
//! is written as `%XX`. Distinct ids always map to distinct names.

use std::fmt::Write;

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Encode a note id as a file stem.
pub(super) fn encode(note_id: &str) -> String {
    let mut out = String::with_capacity(note_id.len());
    for byte in note_id.bytes() {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

/// Decode a file stem produced by [`encode`].
///
/// Returns `None` for stems [`encode`] could not have produced.
pub(super) fn decode(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = stem.get(i + 1..i + 3)?;
                if !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
                    return None;
                }
                let byte = u8::from_str_radix(hex, 16).ok()?;
                if is_plain(byte) {
                    return None;
                }
                out.push(byte);
                i += 3;
            }
            byte if is_plain(byte) => {
                out.push(byte);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_unchanged() {
        assert_eq!(encode("note-1_a"), "note-1_a");
        assert_eq!(decode("note-1_a").as_deref(), Some("note-1_a"));
    }

    #[test]
    fn test_separators_escaped() {
        assert_eq!(encode("work/ideas"), "work%2Fideas");
        assert_eq!(encode("work:ideas"), "work%3Aideas");
        assert_eq!(encode("a.b"), "a%2Eb");
        assert_eq!(encode("%"), "%25");
    }

    #[test]
    fn test_non_ascii_ids_decode() {
        for id in ["carnet/été", "日記", "a b%c", "..", ""] {
            assert_eq!(decode(&encode(id)).as_deref(), Some(id));
        }
    }

    #[test]
    fn test_foreign_stems_rejected() {
        assert_eq!(decode("has space"), None);
        assert_eq!(decode("trailing%2"), None);
        assert_eq!(decode("lower%2f"), None);
        // `%41` is `A`, which is never escaped.
        assert_eq!(decode("%41"), None);
        // Lone continuation byte.
        assert_eq!(decode("%80"), None);
    }
}
