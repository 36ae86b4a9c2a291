//! Case conversion for replacement text.
//!
//! Substitution templates can toggle an upper/lower fold that applies to
//! the bytes copied out of capture groups. On UTF-8 buffers the fold is
//! the full Unicode mapping (one character may expand to several); on
//! byte buffers it is the ASCII mapping, applied byte-wise.

/// Case fold applied to text copied out of a capture group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fold {
    #[default]
    None,
    Upper,
    Lower,
}

/// Appends `text` to `dst`, folded per `fold` using full character
/// mappings.
pub fn append_folded_str(dst: &mut Vec<u8>, text: &str, fold: Fold) {
    match fold {
        Fold::None => dst.extend_from_slice(text.as_bytes()),
        Fold::Upper => {
            let mut buf = [0u8; 4];
            for c in text.chars().flat_map(char::to_uppercase) {
                dst.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
        Fold::Lower => {
            let mut buf = [0u8; 4];
            for c in text.chars().flat_map(char::to_lowercase) {
                dst.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Appends `bytes` to `dst`, folded per `fold` using ASCII mappings.
pub fn append_folded_bytes(dst: &mut Vec<u8>, bytes: &[u8], fold: Fold) {
    match fold {
        Fold::None => dst.extend_from_slice(bytes),
        Fold::Upper => dst.extend(bytes.iter().map(u8::to_ascii_uppercase)),
        Fold::Lower => dst.extend(bytes.iter().map(u8::to_ascii_lowercase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folded_str(text: &str, fold: Fold) -> String {
        let mut out = Vec::new();
        append_folded_str(&mut out, text, fold);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn str_folds() {
        assert_eq!(folded_str("foo bar", Fold::Upper), "FOO BAR");
        assert_eq!(folded_str("Straße", Fold::Upper), "STRASSE");
        assert_eq!(folded_str("ÉCLAIR", Fold::Lower), "éclair");
        assert_eq!(folded_str("mixed", Fold::None), "mixed");
    }

    #[test]
    fn byte_folds() {
        let mut out = Vec::new();
        append_folded_bytes(&mut out, b"a\xffB", Fold::Upper);
        assert_eq!(out, b"A\xffB");
        out.clear();
        append_folded_bytes(&mut out, b"A\xffB", Fold::Lower);
        assert_eq!(out, b"a\xffb");
    }
}
