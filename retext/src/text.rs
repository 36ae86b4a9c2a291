//! Text vectors and their per-element encoding tags.
//!
//! A [`TextVec`] is the unit every operation works over: an ordered
//! sequence of immutable byte strings, each carrying the encoding it was
//! declared with, plus an optional names vector that operations preserve.
//! The distinguished [`TextElem::Missing`] value propagates through every
//! operation rather than erroring.

use retext_encoding::ascii::is_ascii;

/// Declared encoding of one text element.
///
/// `Bytes` means the payload must never be reinterpreted under any
/// character encoding; it forces byte semantics for the whole call.
/// `Unknown` is text in the host's native locale encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Unknown,
    Latin1,
    Utf8,
    Bytes,
    Ascii,
}

/// One element of a [`TextVec`]: a tagged byte string, or the missing
/// value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextElem {
    /// The distinguished missing value.
    Missing,
    Str {
        bytes: Vec<u8>,
        enc: Encoding,
    },
}

impl TextElem {
    /// Native-encoding text (tag [`Encoding::Unknown`]).
    pub fn native(s: impl Into<String>) -> Self {
        TextElem::Str { bytes: s.into().into_bytes(), enc: Encoding::Unknown }
    }

    /// UTF-8-tagged text.
    pub fn utf8(s: impl Into<String>) -> Self {
        TextElem::Str { bytes: s.into().into_bytes(), enc: Encoding::Utf8 }
    }

    /// Latin-1-tagged bytes.
    pub fn latin1(bytes: impl Into<Vec<u8>>) -> Self {
        TextElem::Str { bytes: bytes.into(), enc: Encoding::Latin1 }
    }

    /// Byte-tagged payload; never reinterpreted as characters.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        TextElem::Str { bytes: bytes.into(), enc: Encoding::Bytes }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, TextElem::Missing)
    }

    /// Payload bytes, unless missing.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TextElem::Missing => None,
            TextElem::Str { bytes, .. } => Some(bytes),
        }
    }

    /// Declared encoding, unless missing.
    pub fn enc(&self) -> Option<Encoding> {
        match self {
            TextElem::Missing => None,
            TextElem::Str { enc, .. } => Some(*enc),
        }
    }

    /// The payload as UTF-8 text, when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Whether the payload is pure ASCII. Missing elements count as ASCII:
    /// they carry no bytes that could constrain the execution mode.
    pub(crate) fn is_ascii(&self) -> bool {
        self.as_bytes().map_or(true, is_ascii)
    }
}

impl From<&str> for TextElem {
    fn from(s: &str) -> Self {
        TextElem::native(s)
    }
}

impl From<String> for TextElem {
    fn from(s: String) -> Self {
        TextElem::native(s)
    }
}

/// An ordered sequence of [`TextElem`]s with an optional names vector of
/// equal length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextVec {
    elems: Vec<TextElem>,
    names: Option<Vec<String>>,
}

impl TextVec {
    pub fn new() -> Self {
        TextVec::default()
    }

    pub fn from_elems(elems: Vec<TextElem>) -> Self {
        TextVec { elems, names: None }
    }

    pub fn from_strs<'a, I>(strs: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        strs.into_iter().map(TextElem::from).collect()
    }

    /// Attaches a names vector. `names` must have one entry per element.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        assert_eq!(names.len(), self.elems.len(), "names length must match");
        self.names = Some(names);
        self
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub(crate) fn set_names(&mut self, names: Option<Vec<String>>) {
        self.names = names;
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&TextElem> {
        self.elems.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextElem> {
        self.elems.iter()
    }

    pub fn push(&mut self, elem: TextElem) {
        self.elems.push(elem);
    }

    pub fn elems(&self) -> &[TextElem] {
        &self.elems
    }
}

impl FromIterator<TextElem> for TextVec {
    fn from_iter<T: IntoIterator<Item = TextElem>>(iter: T) -> Self {
        TextVec::from_elems(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for TextVec {
    type Output = TextElem;

    fn index(&self, i: usize) -> &TextElem {
        &self.elems[i]
    }
}
