//! Wide (UTF-32) subject buffers.
//!
//! The wide path keeps two views of the same subject: the code points as a
//! [`U32String`], where every index is already a character position, and
//! the UTF-8 re-encoding that byte-oriented engines consume. Offsets into
//! the UTF-8 view translate to wide offsets through
//! [`crate::utf8::CharMapper`].

use widestring::{U32Str, U32String};

/// A subject decoded to wide characters, with its UTF-8 mirror.
#[derive(Clone, Debug)]
pub struct WideBuf {
    wide: U32String,
    utf8: String,
}

impl WideBuf {
    pub fn from_utf8(utf8: impl Into<String>) -> Self {
        let utf8 = utf8.into();
        let wide = U32String::from_vec(utf8.chars().map(|c| c as u32).collect::<Vec<u32>>());
        WideBuf { wide, utf8 }
    }

    /// The wide view. Indices are character positions.
    pub fn wide(&self) -> &U32Str {
        &self.wide
    }

    /// The UTF-8 view handed to byte-oriented engines.
    pub fn utf8(&self) -> &str {
        &self.utf8
    }

    /// Length in characters.
    pub fn nchars(&self) -> usize {
        self.wide.len()
    }

    /// The characters of the subject, in order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        // Every element came from a char, so the conversion back is total.
        self.wide
            .as_slice()
            .iter()
            .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}
