//! Execution-mode selection.
//!
//! The mode is chosen once per call, before any per-element work, from the
//! pattern, the replacement (when the operation has one) and the text
//! vector(s). Everything downstream (normalization, engine flags, index
//! reporting) keys off it.

use crate::{
    context::Locale,
    matcher::Dialect,
    text::{Encoding, TextElem, TextVec},
};

/// How subjects are interpreted for the duration of one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Raw byte semantics; positions are byte offsets.
    Bytes,
    /// Every input is pure ASCII: scanned as bytes, reported as characters
    /// (the two coincide).
    Ascii,
    /// UTF-8 semantics; engines see UTF-8 bytes, positions are characters.
    Utf8,
    /// Wide-character path of the extended dialect; positions are native
    /// character offsets of the decoded subject.
    Wide,
}

impl Mode {
    /// Whether user-visible indices are byte offsets.
    pub fn reports_bytes(self) -> bool {
        matches!(self, Mode::Bytes)
    }

    /// Whether subjects are decoded to character data.
    pub fn is_char_mode(self) -> bool {
        matches!(self, Mode::Utf8 | Mode::Wide)
    }
}

/// Picks the execution mode for one call.
///
/// `fixed_inputs` carries the pattern and, for substitution, the
/// replacement; `vectors` the text vector(s) being operated on. Missing
/// elements never constrain the choice.
pub(crate) fn classify(
    dialect: Dialect,
    use_bytes: bool,
    locale: Locale,
    fixed_inputs: &[&TextElem],
    vectors: &[&TextVec],
) -> Mode {
    if use_bytes {
        return Mode::Bytes;
    }

    let all = || {
        fixed_inputs
            .iter()
            .copied()
            .chain(vectors.iter().flat_map(|v| v.iter()))
    };

    // ASCII is a safe subset of every encoding in play.
    if all().all(TextElem::is_ascii) {
        return Mode::Ascii;
    }
    if all().any(|e| e.enc() == Some(Encoding::Bytes)) {
        return Mode::Bytes;
    }

    let mut utf8 = locale.is_utf8();
    if dialect == Dialect::Perl && locale.is_multibyte() {
        utf8 = true;
    }
    if all().any(|e| e.enc() == Some(Encoding::Utf8)) {
        utf8 = true;
    }
    if !locale.is_latin1() && all().any(|e| e.enc() == Some(Encoding::Latin1)) {
        utf8 = true;
    }

    match (dialect, utf8) {
        // The extended engine's character path runs on decoded subjects.
        (Dialect::Extended, true) => Mode::Wide,
        (_, true) => Mode::Utf8,
        _ => Mode::Bytes,
    }
}
