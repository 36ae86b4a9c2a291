//! Per-element subject normalization.
//!
//! Produces the canonical buffer the engines expect for the current mode:
//! raw bytes, validated (possibly transcoded) UTF-8, or the wide dual
//! buffer. Buffers borrow from the element whenever the payload is already
//! in the right form.

use std::borrow::Cow;

use retext_encoding::{utf8::latin1_to_utf8, wide::WideBuf};

use crate::{
    context::Locale,
    matcher::mode::Mode,
    text::{Encoding, TextElem},
};

/// A normalized subject buffer.
pub(crate) enum Subject<'a> {
    Bytes(&'a [u8]),
    Utf8(Cow<'a, str>),
    Wide(WideBuf),
}

impl Subject<'_> {
    /// The byte view handed to the engines.
    pub fn engine_bytes(&self) -> &[u8] {
        match self {
            Subject::Bytes(b) => b,
            Subject::Utf8(s) => s.as_bytes(),
            Subject::Wide(w) => w.utf8().as_bytes(),
        }
    }

    /// The character view, in character modes.
    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Subject::Bytes(_) => None,
            Subject::Utf8(s) => Some(s),
            Subject::Wide(w) => Some(w.utf8()),
        }
    }

}

/// Outcome of normalizing one element.
pub(crate) enum Prepared<'a> {
    Missing,
    /// The payload is not valid in the chosen mode (bad UTF-8 or bad
    /// native multibyte data). The element yields its missing/no-match
    /// result and the call continues.
    Invalid,
    Ok(Subject<'a>),
}

pub(crate) fn normalize<'a>(elem: &'a TextElem, mode: Mode, locale: Locale) -> Prepared<'a> {
    let (bytes, enc) = match elem {
        TextElem::Missing => return Prepared::Missing,
        TextElem::Str { bytes, enc } => (bytes.as_slice(), *enc),
    };
    match mode {
        Mode::Bytes | Mode::Ascii => Prepared::Ok(Subject::Bytes(bytes)),
        Mode::Utf8 | Mode::Wide => {
            let Some(text) = decode(bytes, enc, locale) else {
                return Prepared::Invalid;
            };
            Prepared::Ok(if mode == Mode::Wide {
                Subject::Wide(WideBuf::from_utf8(text))
            } else {
                Subject::Utf8(text)
            })
        }
    }
}

fn decode(bytes: &[u8], enc: Encoding, locale: Locale) -> Option<Cow<'_, str>> {
    match enc {
        Encoding::Latin1 => Some(Cow::Owned(latin1_to_utf8(bytes))),
        Encoding::Unknown if locale.is_latin1() => Some(Cow::Owned(latin1_to_utf8(bytes))),
        // Byte-tagged input forces byte mode during classification, so a
        // character mode never sees it.
        Encoding::Bytes => None,
        _ => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
    }
}
