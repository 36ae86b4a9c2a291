//! Search operations: membership, first-match and all-matches queries.

use retext_encoding::utf8::CharMapper;

use crate::{
    context::Context,
    engine::{driver, Compiled},
    error::{Error, Result},
    matcher::{
        mode::{classify, Mode},
        result::{CaptureInfo, GregexprResult, IndexType, MatchList, RegexecResult, RegexprResult},
        subject::{normalize, Prepared, Subject},
        cloned_names, Dialect, Matcher,
    },
    text::{TextElem, TextVec},
};

/// Byte-offset to user-position translation for one subject.
enum UserPos<'a> {
    Identity,
    Chars(CharMapper<'a>),
}

impl<'a> UserPos<'a> {
    fn new(mode: Mode, subject: &'a Subject<'_>) -> Self {
        if mode.is_char_mode() {
            UserPos::Chars(CharMapper::new(subject.as_utf8().unwrap_or("")))
        } else {
            UserPos::Identity
        }
    }

    fn at(&mut self, byte: usize) -> usize {
        match self {
            UserPos::Identity => byte,
            UserPos::Chars(m) => m.chars_at(byte),
        }
    }

    /// 1-based start and length of a byte span, in user units.
    fn span(&mut self, (s, e): (usize, usize)) -> (i32, i32) {
        let cs = self.at(s);
        let ce = self.at(e);
        (cs as i32 + 1, (ce - cs) as i32)
    }
}

fn index_type(mode: Mode) -> IndexType {
    if mode.reports_bytes() {
        IndexType::Bytes
    } else {
        IndexType::Chars
    }
}


impl Matcher {
    fn elem_is_match(
        &self,
        c: &mut Compiled,
        elem: &TextElem,
        mode: Mode,
        ctx: &mut Context,
        i: usize,
    ) -> bool {
        let locale = ctx.locale();
        match normalize(elem, mode, locale) {
            Prepared::Missing => false,
            Prepared::Invalid => {
                ctx.warn_invalid_input(i);
                false
            }
            Prepared::Ok(subj) => {
                driver::first_match(c, subj.engine_bytes(), 0, false, ctx, i).is_some()
            }
        }
    }

    /// 1-based indices of the elements the pattern matches (or, with
    /// `invert`, does not match). Missing and undecodable elements count
    /// as non-matches. A missing pattern yields one missing index per
    /// element.
    pub fn grep(&self, x: &TextVec, invert: bool, ctx: &mut Context) -> Result<Vec<Option<i32>>> {
        let Some((mode, _, mut c)) = self.call_setup(None, x, ctx)? else {
            return Ok(vec![None; x.len()]);
        };
        let mut out = Vec::new();
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            if self.elem_is_match(&mut c, elem, mode, ctx, i) != invert {
                out.push(Some(i as i32 + 1));
            }
        }
        Ok(out)
    }

    /// The matching (or, with `invert`, non-matching) elements
    /// themselves, names filtered alongside.
    pub fn grep_values(&self, x: &TextVec, invert: bool, ctx: &mut Context) -> Result<TextVec> {
        if self.pattern.is_missing() {
            ctx.begin_call();
            let mut out = TextVec::from_elems(vec![TextElem::Missing; x.len()]);
            out.set_names(cloned_names(x));
            return Ok(out);
        }
        let Some((mode, _, mut c)) = self.call_setup(None, x, ctx)? else {
            unreachable!("missing pattern handled above");
        };
        let mut keep = Vec::new();
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            if self.elem_is_match(&mut c, elem, mode, ctx, i) != invert {
                keep.push(i);
            }
        }
        let mut out = TextVec::from_elems(keep.iter().map(|&i| x[i].clone()).collect());
        if let Some(names) = x.names() {
            out.set_names(Some(keep.iter().map(|&i| names[i].clone()).collect()));
        }
        Ok(out)
    }

    /// Per-element match indicator; missing and undecodable elements
    /// yield the missing value.
    pub fn grepl(&self, x: &TextVec, ctx: &mut Context) -> Result<Vec<Option<bool>>> {
        let Some((mode, _, mut c)) = self.call_setup(None, x, ctx)? else {
            return Ok(vec![None; x.len()]);
        };
        let locale = ctx.locale();
        let mut out = Vec::with_capacity(x.len());
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            out.push(match normalize(elem, mode, locale) {
                Prepared::Missing => None,
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    None
                }
                Prepared::Ok(subj) => {
                    Some(driver::first_match(&mut c, subj.engine_bytes(), 0, false, ctx, i).is_some())
                }
            });
        }
        Ok(out)
    }

    /// Position and length of the first match in each element, with
    /// capture positions for Perl-dialect patterns that have groups.
    pub fn regexpr(&self, x: &TextVec, ctx: &mut Context) -> Result<RegexprResult> {
        let Some((mode, dialect, mut c)) = self.call_setup(None, x, ctx)? else {
            return Ok(RegexprResult {
                start: vec![None; x.len()],
                length: vec![None; x.len()],
                index_type: IndexType::Chars,
                use_bytes: false,
                captures: None,
            });
        };
        let gc = c.group_count();
        let want_caps = dialect == Dialect::Perl && gc > 0;

        let locale = ctx.locale();
        let mut start = Vec::with_capacity(x.len());
        let mut length = Vec::with_capacity(x.len());
        let mut cap_start = Vec::new();
        let mut cap_length = Vec::new();
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            let found = match normalize(elem, mode, locale) {
                Prepared::Missing => None,
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    None
                }
                Prepared::Ok(subj) => {
                    match driver::first_match(&mut c, subj.engine_bytes(), 0, want_caps, ctx, i) {
                        Some(m) => {
                            let mut pos = UserPos::new(mode, &subj);
                            let (s1, len) = pos.span((m.start, m.end));
                            let mut srow = Vec::with_capacity(gc);
                            let mut lrow = Vec::with_capacity(gc);
                            if want_caps {
                                for g in m.groups.as_deref().unwrap_or_default() {
                                    match g {
                                        Some(span) => {
                                            let (gs, gl) = pos.span(*span);
                                            srow.push(Some(gs));
                                            lrow.push(Some(gl));
                                        }
                                        None => {
                                            srow.push(Some(-1));
                                            lrow.push(Some(-1));
                                        }
                                    }
                                }
                            }
                            Some((s1, len, srow, lrow))
                        }
                        None => Some((-1, -1, vec![Some(-1); gc], vec![Some(-1); gc])),
                    }
                }
            };
            match found {
                Some((s1, len, srow, lrow)) => {
                    start.push(Some(s1));
                    length.push(Some(len));
                    if want_caps {
                        cap_start.push(srow);
                        cap_length.push(lrow);
                    }
                }
                None => {
                    start.push(None);
                    length.push(None);
                    if want_caps {
                        cap_start.push(vec![None; gc]);
                        cap_length.push(vec![None; gc]);
                    }
                }
            }
        }

        let captures = want_caps.then(|| CaptureInfo {
            names: c.group_names().unwrap_or_else(|| vec![String::new(); gc]),
            start: cap_start,
            length: cap_length,
        });
        Ok(RegexprResult {
            start,
            length,
            index_type: index_type(mode),
            use_bytes: mode.reports_bytes(),
            captures,
        })
    }

    /// Positions and lengths of every match in each element.
    pub fn gregexpr(&self, x: &TextVec, ctx: &mut Context) -> Result<GregexprResult> {
        let Some((mode, dialect, mut c)) = self.call_setup(None, x, ctx)? else {
            return Ok(GregexprResult {
                elems: vec![None; x.len()],
                capture_names: None,
                index_type: IndexType::Chars,
                use_bytes: false,
                names: cloned_names(x),
            });
        };
        let gc = c.group_count();
        let want_caps = dialect == Dialect::Perl && gc > 0;
        let capture_names =
            want_caps.then(|| c.group_names().unwrap_or_else(|| vec![String::new(); gc]));

        let locale = ctx.locale();
        let mut elems = Vec::with_capacity(x.len());
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            elems.push(match normalize(elem, mode, locale) {
                Prepared::Missing => None,
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    None
                }
                Prepared::Ok(subj) => {
                    let found =
                        driver::all_matches(&mut c, subj.engine_bytes(), mode, 0, want_caps, ctx, i)?;
                    Some(assemble(&found, mode, &subj, gc, want_caps))
                }
            });
        }
        Ok(GregexprResult {
            elems,
            capture_names,
            index_type: index_type(mode),
            use_bytes: mode.reports_bytes(),
            names: cloned_names(x),
        })
    }

    /// Whole-match plus capture-group positions of the first match in
    /// each element. Not available for the Perl dialect.
    pub fn regexec(&self, x: &TextVec, ctx: &mut Context) -> Result<RegexecResult> {
        ctx.begin_call();
        let (dialect, ignore_case) = self.effective(ctx);
        if dialect == Dialect::Perl {
            return Err(Error::Unsupported(
                "'perl = TRUE' is not supported by this operation",
            ));
        }
        if self.pattern.is_missing() {
            return Ok(RegexecResult {
                elems: vec![None; x.len()],
                index_type: IndexType::Chars,
                use_bytes: false,
                names: cloned_names(x),
            });
        }
        let mode = classify(dialect, self.use_bytes, ctx.locale(), &[&self.pattern], &[x]);
        let mut c = crate::engine::compile(&self.pattern, dialect, mode, ignore_case, ctx.locale())?;
        let gc = c.group_count();

        let locale = ctx.locale();
        let mut elems = Vec::with_capacity(x.len());
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            elems.push(match normalize(elem, mode, locale) {
                Prepared::Missing => None,
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    None
                }
                Prepared::Ok(subj) => {
                    match driver::first_match(&mut c, subj.engine_bytes(), 0, true, ctx, i) {
                        Some(m) => {
                            let mut pos = UserPos::new(mode, &subj);
                            let mut start = Vec::with_capacity(gc + 1);
                            let mut length = Vec::with_capacity(gc + 1);
                            let (s1, len) = pos.span((m.start, m.end));
                            start.push(s1);
                            length.push(len);
                            for g in m.groups.as_deref().unwrap_or_default() {
                                match g {
                                    Some(span) => {
                                        let (gs, gl) = pos.span(*span);
                                        start.push(gs);
                                        length.push(gl);
                                    }
                                    None => {
                                        start.push(-1);
                                        length.push(-1);
                                    }
                                }
                            }
                            Some(MatchList { start, length, ..MatchList::default() })
                        }
                        None => Some(MatchList {
                            start: vec![-1],
                            length: vec![-1],
                            ..MatchList::default()
                        }),
                    }
                }
            });
        }
        Ok(RegexecResult {
            elems,
            index_type: index_type(mode),
            use_bytes: mode.reports_bytes(),
            names: cloned_names(x),
        })
    }
}

fn assemble(
    found: &[driver::Found],
    mode: Mode,
    subj: &Subject<'_>,
    gc: usize,
    want_caps: bool,
) -> MatchList {
    if found.is_empty() {
        return MatchList {
            start: vec![-1],
            length: vec![-1],
            capture_start: if want_caps { vec![vec![-1; gc]] } else { Vec::new() },
            capture_length: if want_caps { vec![vec![-1; gc]] } else { Vec::new() },
        };
    }
    let mut pos = UserPos::new(mode, subj);
    let mut out = MatchList::default();
    for m in found {
        let (s1, len) = pos.span((m.start, m.end));
        out.start.push(s1);
        out.length.push(len);
        if want_caps {
            let mut srow = Vec::with_capacity(gc);
            let mut lrow = Vec::with_capacity(gc);
            for g in m.groups.as_deref().unwrap_or_default() {
                match g {
                    Some(span) => {
                        let (gs, gl) = pos.span(*span);
                        srow.push(gs);
                        lrow.push(gl);
                    }
                    None => {
                        srow.push(-1);
                        lrow.push(-1);
                    }
                }
            }
            out.capture_start.push(srow);
            out.capture_length.push(lrow);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pat: &str) -> Matcher {
        Matcher::builder().build(pat.into())
    }

    #[test]
    fn grep_indices_and_values() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["x1", "y", "xx"]);
        let q = m("^x");
        assert_eq!(q.grep(&x, false, &mut ctx).unwrap(), vec![Some(1), Some(3)]);
        let vals = q.grep_values(&x, false, &mut ctx).unwrap();
        assert_eq!(vals, TextVec::from_strs(["x1", "xx"]));
    }

    #[test]
    fn grep_invert_includes_missing() {
        let mut ctx = Context::new();
        let x = TextVec::from_elems(vec![
            TextElem::native("abc"),
            TextElem::Missing,
            TextElem::native("xyz"),
        ]);
        let q = m("a");
        assert_eq!(q.grep(&x, true, &mut ctx).unwrap(), vec![Some(2), Some(3)]);
        let vals = q.grep_values(&x, true, &mut ctx).unwrap();
        assert_eq!(vals[0], TextElem::Missing);
        assert_eq!(vals[1], TextElem::native("xyz"));
    }

    #[test]
    fn grep_value_keeps_names() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["ab", "cd"])
            .with_names(vec!["first".into(), "second".into()]);
        let vals = m("a").grep_values(&x, false, &mut ctx).unwrap();
        assert_eq!(vals.names().unwrap(), ["first"]);
    }

    #[test]
    fn grepl_propagates_missing() {
        let mut ctx = Context::new();
        let x = TextVec::from_elems(vec![TextElem::native("abc"), TextElem::Missing]);
        assert_eq!(m("b").grepl(&x, &mut ctx).unwrap(), vec![Some(true), None]);
    }

    #[test]
    fn missing_pattern_propagates() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["a", "b"]);
        let q = Matcher::builder().build(TextElem::Missing);
        assert_eq!(q.grep(&x, false, &mut ctx).unwrap(), vec![None, None]);
        assert_eq!(q.grepl(&x, &mut ctx).unwrap(), vec![None, None]);
        let r = q.regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![None, None]);
        let g = q.gregexpr(&x, &mut ctx).unwrap();
        assert_eq!(g.elems, vec![None, None]);
    }

    #[test]
    fn regexpr_positions() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["baaabcaad", "xyz"]);
        let r = m("a+").regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(2), Some(-1)]);
        assert_eq!(r.length, vec![Some(3), Some(-1)]);
        assert_eq!(r.index_type, IndexType::Chars);
        assert!(!r.use_bytes);
        assert!(r.captures.is_none());
    }

    #[test]
    fn regexpr_character_positions_on_utf8() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["xéy漢b"]);
        let r = m("y.b").regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(3)]);
        assert_eq!(r.length, vec![Some(3)]);
        assert_eq!(r.index_type, IndexType::Chars);
    }

    #[test]
    fn regexpr_byte_positions_with_use_bytes() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["xéy"]);
        let q = Matcher::builder().use_bytes(true).build("y".into());
        let r = q.regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(4)]);
        assert_eq!(r.index_type, IndexType::Bytes);
        assert!(r.use_bytes);
    }

    #[test]
    fn gregexpr_positions() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["baaabcaad"]);
        let g = m("a+").gregexpr(&x, &mut ctx).unwrap();
        let ml = g.elems[0].as_ref().unwrap();
        assert_eq!(ml.start, vec![2, 7]);
        assert_eq!(ml.length, vec![3, 2]);
    }

    #[test]
    fn gregexpr_no_match_sentinel() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["zzz"]);
        let g = m("a").gregexpr(&x, &mut ctx).unwrap();
        let ml = g.elems[0].as_ref().unwrap();
        assert_eq!(ml.start, vec![-1]);
        assert_eq!(ml.length, vec![-1]);
    }

    #[test]
    fn gregexpr_empty_match_run() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["baaab"]);
        let g = m("a*").gregexpr(&x, &mut ctx).unwrap();
        let ml = g.elems[0].as_ref().unwrap();
        assert_eq!(ml.start, vec![1, 2, 5, 6]);
        assert_eq!(ml.length, vec![0, 3, 0, 0]);
    }

    #[test]
    fn invalid_input_warns_and_goes_missing() {
        let mut ctx = Context::new();
        let x = TextVec::from_elems(vec![
            TextElem::Str { bytes: b"a\xffb".to_vec(), enc: crate::text::Encoding::Unknown },
            TextElem::utf8("naïve"),
        ]);
        let r = m("a").grepl(&x, &mut ctx).unwrap();
        assert_eq!(r, vec![None, Some(true)]);
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].contains("input string 1"));
    }

    #[test]
    fn regexec_groups() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["xab"]);
        let r = m("(a)(c)?").regexec(&x, &mut ctx).unwrap();
        let ml = r.elems[0].as_ref().unwrap();
        assert_eq!(ml.start, vec![2, 2, -1]);
        assert_eq!(ml.length, vec![1, 1, -1]);
    }

    #[test]
    fn regexec_rejects_perl() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["a"]);
        let q = Matcher::builder().perl(true).build("a".into());
        assert!(matches!(q.regexec(&x, &mut ctx), Err(Error::Unsupported(_))));
    }

    #[cfg(feature = "perl")]
    #[test]
    fn perl_captures_with_names() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["hello world", "nope"]);
        let q = Matcher::builder().perl(true).build(r"(?<first>\w+) (\w+)".into());
        let r = q.regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(1), Some(-1)]);
        assert_eq!(r.length, vec![Some(11), Some(-1)]);
        let caps = r.captures.unwrap();
        assert_eq!(caps.names, vec!["first".to_string(), String::new()]);
        assert_eq!(caps.start[0], vec![Some(1), Some(7)]);
        assert_eq!(caps.length[0], vec![Some(5), Some(5)]);
        assert_eq!(caps.start[1], vec![Some(-1), Some(-1)]);
    }

    #[cfg(feature = "perl")]
    #[test]
    fn perl_capture_containment() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["ab cd ef"]);
        let q = Matcher::builder().perl(true).build(r"(\w)(\w)".into());
        let g = q.gregexpr(&x, &mut ctx).unwrap();
        let ml = g.elems[0].as_ref().unwrap();
        assert_eq!(ml.start.len(), 3);
        for j in 0..ml.start.len() {
            let (ms, mlen) = (ml.start[j], ml.length[j]);
            for k in 0..ml.capture_start[j].len() {
                let (cs, cl) = (ml.capture_start[j][k], ml.capture_length[j][k]);
                assert!(cs >= ms);
                assert!(cs + cl <= ms + mlen);
            }
        }
    }

    #[cfg(feature = "perl")]
    #[test]
    fn perl_character_positions() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["é漢b"]);
        let q = Matcher::builder().perl(true).build("b".into());
        let r = q.regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(3)]);
        assert_eq!(r.length, vec![Some(1)]);
    }
}
