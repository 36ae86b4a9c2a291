//! UTF-8 position mapping and transcoding.
//!
//! Matching engines report byte offsets; user-visible match positions are
//! in characters unless the caller asked for byte semantics. [`CharMapper`]
//! performs that translation incrementally, so mapping every match of an
//! element costs one pass over the element.

/// Length in bytes of the UTF-8 sequence starting at byte offset `at` of
/// `s`, or `0` when `at` is at or past the end.
///
/// `at` must lie on a character boundary.
#[inline]
pub fn next_char_len(s: &str, at: usize) -> usize {
    s[at..].chars().next().map_or(0, char::len_utf8)
}

/// Length in bytes of the UTF-8 sequence introduced by lead byte `lead`.
///
/// Continuation and impossible bytes report `1` so byte-wise advancement
/// always makes progress on damaged data.
#[inline]
pub fn lead_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Number of characters in `s[..byte]`. `byte` must lie on a character
/// boundary.
pub fn char_count_to(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// Incremental byte-offset to character-offset translation over one
/// subject buffer.
///
/// Offsets are usually requested in increasing order (match positions
/// within an element are sorted), so the mapper keeps its last position
/// and only scans forward. A backwards request falls back to recounting
/// from the start; correctness does not depend on monotonic use.
#[derive(Clone, Debug)]
pub struct CharMapper<'a> {
    s: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharMapper<'a> {
    pub fn new(s: &'a str) -> Self {
        CharMapper { s, byte: 0, chars: 0 }
    }

    /// Character offset corresponding to byte offset `byte` (which must
    /// lie on a character boundary).
    pub fn chars_at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.s[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Converts Latin-1 (ISO-8859-1) bytes to an owned UTF-8 string.
///
/// Every byte maps to the Unicode code point of the same value, so this
/// conversion cannot fail.
pub fn latin1_to_utf8(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
