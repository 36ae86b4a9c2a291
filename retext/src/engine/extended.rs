//! The extended (POSIX-style) dialect, driven by a bounded backtracker.
//!
//! Character modes run the engine over the subject's UTF-8 view with
//! Unicode semantics; byte modes disable both Unicode and the UTF-8
//! pattern restriction so patterns can address arbitrary bytes. The
//! backtracker's visited-set capacity bounds the work done on any single
//! element; blowing it is a per-element condition, not a call failure.

use regex_automata::{
    nfa::thompson::{
        self,
        backtrack::{BoundedBacktracker, Cache},
    },
    util::{captures::Captures, syntax},
    Input,
};
use regex_syntax::hir::HirKind;

use crate::{
    engine::{CapSpans, EngineError},
    error::{Error, Result},
    matcher::mode::Mode,
};

/// Visited-set capacity of the backtracker, in bytes. Bounds the
/// per-element product of haystack length and pattern size.
const VISITED_CAPACITY: usize = 8 << 20;

#[derive(Debug)]
pub(crate) struct Extended {
    re: BoundedBacktracker,
    cache: Cache,
    caps: Captures,
}

impl Extended {
    pub fn compile(pattern: &str, mode: Mode, ignore_case: bool) -> Result<Self> {
        let chars = mode.is_char_mode();
        let re = BoundedBacktracker::builder()
            .configure(BoundedBacktracker::config().visited_capacity(VISITED_CAPACITY))
            .syntax(
                syntax::Config::new()
                    .case_insensitive(ignore_case)
                    .unicode(chars)
                    .utf8(chars),
            )
            .thompson(thompson::Config::new().utf8(chars))
            .build(pattern)
            .map_err(|e| Error::BadPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;
        let cache = re.create_cache();
        let caps = re.create_captures();
        Ok(Extended { re, cache, caps })
    }

    /// Number of capture groups, not counting the implicit whole-match
    /// group.
    pub fn group_count(&self) -> usize {
        self.caps.group_len().saturating_sub(1)
    }

    pub fn find_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<(usize, usize)>, EngineError> {
        self.re
            .try_find(&mut self.cache, Input::new(hay).range(at..))
            .map(|m| m.map(|m| (m.start(), m.end())))
            .map_err(EngineError::new)
    }

    pub fn captures_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<CapSpans>, EngineError> {
        self.re
            .try_captures(&mut self.cache, Input::new(hay).range(at..), &mut self.caps)
            .map_err(EngineError::new)?;
        if !self.caps.is_match() {
            return Ok(None);
        }
        let Some(full) = self.caps.get_group(0) else {
            return Ok(None);
        };
        let groups = (1..self.caps.group_len())
            .map(|i| self.caps.get_group(i).map(|s| (s.start, s.end)))
            .collect();
        Ok(Some(CapSpans { full: (full.start, full.end), groups }))
    }
}

/// When the pattern's HIR is a plain literal, returns its bytes so the
/// call can run on the literal matcher instead of the engine. Only
/// attempted for case-sensitive searches; a caseless literal is not a
/// plain byte needle.
pub(crate) fn as_plain_literal(pattern: &str, mode: Mode) -> Option<Vec<u8>> {
    let chars = mode.is_char_mode();
    let hir = regex_syntax::ParserBuilder::new()
        .unicode(chars)
        .utf8(chars)
        .build()
        .parse(pattern)
        .ok()?;
    match hir.kind() {
        HirKind::Empty => Some(Vec::new()),
        HirKind::Literal(lit) => Some(lit.0.to_vec()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_and_groups() {
        let mut e = Extended::compile("([a-z]+)([0-9]*)", Mode::Ascii, false).unwrap();
        assert_eq!(e.group_count(), 2);
        let m = e.captures_at(b"  abc12", 0).unwrap().unwrap();
        assert_eq!(m.full, (2, 7));
        assert_eq!(m.groups, vec![Some((2, 5)), Some((5, 7))]);

        let m = e.find_at(b"abc abc", 3).unwrap().unwrap();
        assert_eq!(m, (4, 7));
    }

    #[test]
    fn anchor_respects_offset() {
        let mut e = Extended::compile("^x", Mode::Ascii, false).unwrap();
        assert_eq!(e.find_at(b"xx", 0).unwrap(), Some((0, 1)));
        // continuing past the first match, ^ no longer holds
        assert_eq!(e.find_at(b"xx", 1).unwrap(), None);
    }

    #[test]
    fn unset_group() {
        let mut e = Extended::compile("(a)|(b)", Mode::Ascii, false).unwrap();
        let m = e.captures_at(b"b", 0).unwrap().unwrap();
        assert_eq!(m.groups, vec![None, Some((0, 1))]);
    }

    #[test]
    fn byte_mode_matches_raw_bytes() {
        let mut e = Extended::compile(r"\xFF+", Mode::Bytes, false).unwrap();
        let m = e.find_at(b"a\xff\xffb", 0).unwrap().unwrap();
        assert_eq!(m, (1, 3));
    }

    #[test]
    fn bad_pattern_reports_reason() {
        let err = Extended::compile("(", Mode::Ascii, false).unwrap_err();
        match err {
            Error::BadPattern { pattern, reason } => {
                assert_eq!(pattern, "(");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn literal_downgrade() {
        assert_eq!(as_plain_literal("abc", Mode::Utf8), Some(b"abc".to_vec()));
        assert_eq!(as_plain_literal(r"a\.b", Mode::Utf8), Some(b"a.b".to_vec()));
        assert_eq!(as_plain_literal("", Mode::Utf8), Some(Vec::new()));
        assert_eq!(as_plain_literal("a+", Mode::Utf8), None);
        assert_eq!(as_plain_literal("(a)", Mode::Utf8), None);
    }
}
