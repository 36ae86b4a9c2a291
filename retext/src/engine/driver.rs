//! First-match and all-matches loops shared by every operation.
//!
//! Continuation searches pass the full subject plus a start offset, so
//! `^` stops holding past the subject start without any explicit
//! not-beginning-of-line flag. After an empty match the loop advances by
//! one character (one byte in byte modes) to guarantee progress; an empty
//! match at the end of the subject ends the loop. A progress guard backs
//! all of that up: if the continuation offset ever fails to advance, the
//! element's match set is cut off with a warning.

use retext_encoding::utf8::lead_len;

use crate::{
    context::Context,
    engine::{Compiled, EngineError},
    error::Result,
    matcher::mode::Mode,
};

/// One match of the pattern in one element.
#[derive(Clone, Debug)]
pub(crate) struct Found {
    pub start: usize,
    pub end: usize,
    /// Capture spans, when the operation asked for them.
    pub groups: Option<Vec<Option<(usize, usize)>>>,
}

impl Found {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Width of the character starting at `at`, or 0 at the end of the
/// subject.
pub(crate) fn step(mode: Mode, hay: &[u8], at: usize) -> usize {
    if at >= hay.len() {
        return 0;
    }
    match mode {
        Mode::Bytes | Mode::Ascii => 1,
        Mode::Utf8 | Mode::Wide => lead_len(hay[at]),
    }
}

fn exec(
    c: &mut Compiled,
    hay: &[u8],
    at: usize,
    want_caps: bool,
) -> std::result::Result<Option<Found>, EngineError> {
    if want_caps {
        Ok(c.captures_at(hay, at)?.map(|m| Found {
            start: m.full.0,
            end: m.full.1,
            groups: Some(m.groups),
        }))
    } else {
        Ok(c
            .find_at(hay, at)?
            .map(|(start, end)| Found { start, end, groups: None }))
    }
}

fn warn_engine(ctx: &mut Context, elem: usize, e: &EngineError) {
    ctx.warn(format!("matching error for element {}: {}", elem + 1, e.0));
}

/// First match at or after `from`, or `None`. Engine failures warn and
/// count as no match.
pub(crate) fn first_match(
    c: &mut Compiled,
    hay: &[u8],
    from: usize,
    want_caps: bool,
    ctx: &mut Context,
    elem: usize,
) -> Option<Found> {
    match exec(c, hay, from, want_caps) {
        Ok(m) => m,
        Err(e) => {
            warn_engine(ctx, elem, &e);
            None
        }
    }
}

/// Every match at or after `from`, in order. Engine failures warn and
/// truncate the element's match set at the last success.
pub(crate) fn all_matches(
    c: &mut Compiled,
    hay: &[u8],
    mode: Mode,
    from: usize,
    want_caps: bool,
    ctx: &mut Context,
    elem: usize,
) -> Result<Vec<Found>> {
    let mut out = Vec::new();
    let mut at = from;
    let mut last_at = None;
    while at <= hay.len() {
        ctx.check_interrupt()?;
        if last_at.is_some_and(|prev| at <= prev) {
            ctx.warn("pattern matches an empty string infinitely, returning first match only");
            break;
        }
        last_at = Some(at);

        let m = match exec(c, hay, at, want_caps) {
            Ok(Some(m)) => m,
            Ok(None) => break,
            Err(e) => {
                warn_engine(ctx, elem, &e);
                break;
            }
        };
        let end = m.end;
        let empty = m.is_empty();
        out.push(m);

        if empty {
            let width = step(mode, hay, end);
            if width == 0 {
                // empty match at the end of the subject
                break;
            }
            at = end + width;
        } else {
            at = end;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Locale, engine::compile, matcher::Dialect, text::TextElem};

    fn compiled(pat: &str, mode: Mode) -> Compiled {
        compile(&TextElem::native(pat), Dialect::Extended, mode, false, Locale::Utf8).unwrap()
    }

    fn spans(found: &[Found]) -> Vec<(usize, usize)> {
        found.iter().map(|m| (m.start, m.end)).collect()
    }

    #[test]
    fn all_matches_non_empty() {
        let mut c = compiled("a+", Mode::Ascii);
        let mut ctx = Context::new();
        let ms = all_matches(&mut c, b"baaabcaad", Mode::Ascii, 0, false, &mut ctx, 0).unwrap();
        assert_eq!(spans(&ms), vec![(1, 4), (6, 8)]);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn empty_matches_advance_one_char() {
        let mut c = compiled("a*", Mode::Ascii);
        let mut ctx = Context::new();
        let ms = all_matches(&mut c, b"baaab", Mode::Ascii, 0, false, &mut ctx, 0).unwrap();
        assert_eq!(spans(&ms), vec![(0, 0), (1, 4), (4, 4), (5, 5)]);
    }

    #[test]
    fn empty_pattern_bounded_by_len_plus_one() {
        let mut c = compiled("", Mode::Ascii);
        let mut ctx = Context::new();
        let ms = all_matches(&mut c, b"abc", Mode::Ascii, 0, false, &mut ctx, 0).unwrap();
        assert_eq!(spans(&ms), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn empty_subject_single_empty_match() {
        let mut c = compiled("x*", Mode::Ascii);
        let mut ctx = Context::new();
        let ms = all_matches(&mut c, b"", Mode::Ascii, 0, false, &mut ctx, 0).unwrap();
        assert_eq!(spans(&ms), vec![(0, 0)]);
    }

    #[test]
    fn utf8_advance_is_character_wide() {
        let mut c = compiled("x*", Mode::Utf8);
        let mut ctx = Context::new();
        let hay = "é漢".as_bytes();
        let ms = all_matches(&mut c, hay, Mode::Utf8, 0, false, &mut ctx, 0).unwrap();
        // one empty match per character boundary
        assert_eq!(spans(&ms), vec![(0, 0), (2, 2), (5, 5)]);
    }

    #[test]
    fn first_match_from_offset() {
        let mut c = compiled("a+", Mode::Ascii);
        let mut ctx = Context::new();
        let m = first_match(&mut c, b"baaabcaad", 4, false, &mut ctx, 0).unwrap();
        assert_eq!((m.start, m.end), (6, 8));
    }

    #[test]
    fn capture_spans_travel_with_matches() {
        let mut c = compiled("(a+)(b)?", Mode::Ascii);
        let mut ctx = Context::new();
        let ms = all_matches(&mut c, b"aab a", Mode::Ascii, 0, true, &mut ctx, 0).unwrap();
        assert_eq!(ms.len(), 2);
        assert_eq!(ms[0].groups.as_ref().unwrap()[0], Some((0, 2)));
        assert_eq!(ms[0].groups.as_ref().unwrap()[1], Some((2, 3)));
        assert_eq!(ms[1].groups.as_ref().unwrap()[1], None);
    }
}
