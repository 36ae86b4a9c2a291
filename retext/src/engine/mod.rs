//! The pattern compiler facade.
//!
//! One compile entry point over the three dialects, returning a tagged
//! [`Compiled`] value. The dialect driver is picked here, once per call;
//! the per-match loops only ever see the variant they started with.
//! Engine handles release themselves on every exit path by dropping.

use std::borrow::Cow;
use std::fmt;

use log::debug;

use crate::{
    context::Locale,
    error::{Error, Result},
    matcher::{
        mode::Mode,
        subject::{normalize, Prepared, Subject},
        Dialect,
    },
    text::TextElem,
};

mod extended;
mod literal;
#[cfg(feature = "perl")]
mod perl;

pub(crate) mod driver;

pub(crate) use extended::Extended;
pub(crate) use literal::Literal;

/// A match-time engine failure (resource limits, mostly). Converted into
/// a warning at the element boundary; never unwound through a driver
/// loop.
#[derive(Clone, Debug)]
pub(crate) struct EngineError(pub String);

impl EngineError {
    pub(crate) fn new(e: impl fmt::Display) -> Self {
        EngineError(e.to_string())
    }
}

/// A whole-match span plus one span per capture group; unset groups are
/// `None`. All offsets are byte offsets into the normalized subject and
/// captures lie within the whole match.
pub(crate) struct CapSpans {
    pub full: (usize, usize),
    pub groups: Vec<Option<(usize, usize)>>,
}

/// A compiled pattern, tagged by dialect. Owned by one call and released
/// when the call returns, on every path.
pub(crate) enum Compiled {
    Literal(Literal),
    Extended(Extended),
    #[cfg(feature = "perl")]
    Perl(perl::Perl),
}

impl Compiled {
    /// Number of capture groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        match self {
            Compiled::Literal(_) => 0,
            Compiled::Extended(e) => e.group_count(),
            #[cfg(feature = "perl")]
            Compiled::Perl(p) => p.group_count(),
        }
    }

    /// The named-group table; only the Perl dialect carries one.
    pub fn group_names(&self) -> Option<Vec<String>> {
        match self {
            #[cfg(feature = "perl")]
            Compiled::Perl(p) => Some(p.group_names()),
            _ => None,
        }
    }

    pub fn find_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<(usize, usize)>, EngineError> {
        match self {
            Compiled::Literal(l) => Ok(l.find_at(hay, at)),
            Compiled::Extended(e) => e.find_at(hay, at),
            #[cfg(feature = "perl")]
            Compiled::Perl(p) => p.find_at(hay, at),
        }
    }

    pub fn captures_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<CapSpans>, EngineError> {
        match self {
            Compiled::Literal(l) => Ok(l
                .find_at(hay, at)
                .map(|full| CapSpans { full, groups: Vec::new() })),
            Compiled::Extended(e) => e.captures_at(hay, at),
            #[cfg(feature = "perl")]
            Compiled::Perl(p) => p.captures_at(hay, at),
        }
    }
}

/// Compiles `pattern` for one call.
///
/// The pattern is normalized like a subject first; a payload that is not
/// valid in the chosen mode is a compile error, not a warning.
pub(crate) fn compile(
    pattern: &TextElem,
    dialect: Dialect,
    mode: Mode,
    ignore_case: bool,
    locale: Locale,
) -> Result<Compiled> {
    let subject = match normalize(pattern, mode, locale) {
        Prepared::Ok(s) => s,
        Prepared::Missing => {
            return Err(Error::BadPattern {
                pattern: String::new(),
                reason: "pattern is a missing value".to_owned(),
            })
        }
        Prepared::Invalid => {
            return Err(Error::BadPattern {
                pattern: String::from_utf8_lossy(
                    pattern.as_bytes().unwrap_or_default(),
                )
                .into_owned(),
                reason: "invalid in this locale".to_owned(),
            })
        }
    };

    match dialect {
        Dialect::Literal => Ok(Compiled::Literal(Literal::new(
            subject.engine_bytes().to_vec(),
        ))),
        Dialect::Extended => {
            let pat = pattern_text(&subject);
            if !ignore_case {
                if let Some(needle) = extended::as_plain_literal(&pat, mode) {
                    debug!("extended pattern {pat:?} is a plain literal, downgrading");
                    return Ok(Compiled::Literal(Literal::new(needle)));
                }
            }
            Ok(Compiled::Extended(Extended::compile(&pat, mode, ignore_case)?))
        }
        Dialect::Perl => {
            #[cfg(feature = "perl")]
            {
                let pat = match &subject {
                    Subject::Bytes(b) => {
                        std::str::from_utf8(b).map_err(|_| Error::BadPattern {
                            pattern: String::from_utf8_lossy(b).into_owned(),
                            reason: "invalid UTF-8".to_owned(),
                        })?
                    }
                    other => other.as_utf8().unwrap_or_default(),
                };
                Ok(Compiled::Perl(perl::Perl::compile(pat, mode, ignore_case)?))
            }
            #[cfg(not(feature = "perl"))]
            {
                let _ = ignore_case;
                Err(Error::PerlUnavailable)
            }
        }
    }
}

/// The pattern as engine syntax. Byte-mode patterns with bytes the parser
/// cannot take verbatim (invalid UTF-8, embedded NULs and other control
/// bytes) have those bytes rewritten as `\xHH` escapes, which denote the
/// same raw bytes to the byte-oriented parser. Control bytes are never
/// metacharacters, so the rewrite preserves the pattern's meaning.
fn pattern_text<'a>(subject: &'a Subject<'_>) -> Cow<'a, str> {
    use std::fmt::Write;

    fn verbatim(byte: u8) -> bool {
        byte.is_ascii_graphic() || matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
    }

    match subject {
        Subject::Utf8(s) => Cow::Borrowed(s.as_ref()),
        Subject::Wide(w) => Cow::Borrowed(w.utf8()),
        Subject::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) if s.bytes().all(verbatim) => Cow::Borrowed(s),
            _ => {
                let mut out = String::with_capacity(b.len() + 8);
                for &byte in *b {
                    if verbatim(byte) {
                        out.push(byte as char);
                    } else {
                        // infallible: writing into a String
                        let _ = write!(out, "\\x{byte:02X}");
                    }
                }
                Cow::Owned(out)
            }
        },
    }
}

/// What the Perl-class engine was built with, as reported by
/// [`pcre_config`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PcreConfig {
    pub utf8: bool,
    pub unicode_properties: bool,
    pub jit: bool,
    pub stack: bool,
}

/// Reports the Perl-class engine's capabilities: UTF-8 subject support,
/// Unicode property classes, JIT availability, and whether matching
/// consumes C stack (never, for this engine). Everything is false when
/// the `perl` feature is compiled out.
pub fn pcre_config() -> PcreConfig {
    #[cfg(feature = "perl")]
    {
        perl::runtime_config()
    }
    #[cfg(not(feature = "perl"))]
    {
        PcreConfig::default()
    }
}
