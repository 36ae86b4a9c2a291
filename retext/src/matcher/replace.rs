//! Substitution: first-match and all-matches replacement.
//!
//! The replacement text is parsed into a template once per call:
//! `\1`..`\9` splice capture groups, `\U`/`\L`/`\E` toggle a case fold
//! over spliced groups (Perl dialect only), `\` quotes the next character
//! and a trailing lone `\` is dropped. The literal dialect takes the
//! replacement verbatim. Every byte outside a replaced range is copied
//! through untouched.

use retext_encoding::case::{append_folded_bytes, append_folded_str, Fold};

use crate::{
    context::Context,
    engine::driver::{self, Found},
    error::{Error, Result},
    matcher::{
        cloned_names,
        subject::{normalize, Prepared},
        tag_output, Dialect, Matcher,
    },
    text::{TextElem, TextVec},
};

/// Hard cap on the size of one substituted element.
pub const MAX_RESULT_LEN: usize = (i32::MAX / 2) as usize;

enum Piece {
    Lit(Vec<u8>),
    Group(usize),
    Upper,
    Lower,
    CaseEnd,
}

struct Template {
    pieces: Vec<Piece>,
    uses_groups: bool,
    len_hint: usize,
}

fn parse_template(bytes: &[u8], dialect: Dialect) -> Template {
    // the literal dialect splices the replacement in as-is
    if dialect == Dialect::Literal {
        return Template {
            pieces: vec![Piece::Lit(bytes.to_vec())],
            uses_groups: false,
            len_hint: bytes.len(),
        };
    }
    let case_escapes = dialect == Dialect::Perl;

    let mut pieces = Vec::new();
    let mut lit = Vec::new();
    let mut uses_groups = false;
    let flush = |lit: &mut Vec<u8>, pieces: &mut Vec<Piece>| {
        if !lit.is_empty() {
            pieces.push(Piece::Lit(std::mem::take(lit)));
        }
    };

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            lit.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1).copied() {
            // trailing lone backslash: dropped
            None => break,
            Some(d @ b'1'..=b'9') => {
                flush(&mut lit, &mut pieces);
                pieces.push(Piece::Group(usize::from(d - b'0')));
                uses_groups = true;
            }
            Some(b'U') if case_escapes => {
                flush(&mut lit, &mut pieces);
                pieces.push(Piece::Upper);
            }
            Some(b'L') if case_escapes => {
                flush(&mut lit, &mut pieces);
                pieces.push(Piece::Lower);
            }
            Some(b'E') if case_escapes => {
                flush(&mut lit, &mut pieces);
                pieces.push(Piece::CaseEnd);
            }
            Some(quoted) => lit.push(quoted),
        }
        i += 2;
    }
    flush(&mut lit, &mut pieces);

    let len_hint = bytes.len();
    Template { pieces, uses_groups, len_hint }
}

impl Template {
    /// Appends one instantiation to `out`. The case fold resets at every
    /// match.
    fn emit(&self, subject: &[u8], m: &Found, char_fold: bool, out: &mut Vec<u8>) -> Result<()> {
        let mut fold = Fold::None;
        for piece in &self.pieces {
            match piece {
                Piece::Lit(l) => out.extend_from_slice(l),
                Piece::Upper => fold = Fold::Upper,
                Piece::Lower => fold = Fold::Lower,
                Piece::CaseEnd => fold = Fold::None,
                Piece::Group(d) => {
                    // a group past the pattern's count, or unset in this
                    // match, splices nothing
                    let span = m
                        .groups
                        .as_deref()
                        .and_then(|groups| groups.get(d - 1))
                        .copied()
                        .flatten();
                    if let Some((s, e)) = span {
                        let text = &subject[s..e];
                        match std::str::from_utf8(text) {
                            Ok(text) if char_fold => append_folded_str(out, text, fold),
                            _ => append_folded_bytes(out, text, fold),
                        }
                    }
                }
            }
        }
        if out.len() > MAX_RESULT_LEN {
            return Err(Error::ResultTooLong);
        }
        Ok(())
    }
}

impl Matcher {
    /// Replaces the first match in each element.
    pub fn sub(
        &self,
        replacement: impl Into<TextElem>,
        x: &TextVec,
        ctx: &mut Context,
    ) -> Result<TextVec> {
        self.substitute(replacement.into(), x, false, ctx)
    }

    /// Replaces every match in each element.
    pub fn gsub(
        &self,
        replacement: impl Into<TextElem>,
        x: &TextVec,
        ctx: &mut Context,
    ) -> Result<TextVec> {
        self.substitute(replacement.into(), x, true, ctx)
    }

    fn substitute(
        &self,
        replacement: TextElem,
        x: &TextVec,
        global: bool,
        ctx: &mut Context,
    ) -> Result<TextVec> {
        let Some((mode, dialect, mut c)) = self.call_setup(Some(&replacement), x, ctx)? else {
            let mut out = TextVec::from_elems(vec![TextElem::Missing; x.len()]);
            out.set_names(cloned_names(x));
            return Ok(out);
        };
        let locale = ctx.locale();

        let template = match normalize(&replacement, mode, locale) {
            Prepared::Ok(repl) => parse_template(repl.engine_bytes(), dialect),
            Prepared::Invalid => {
                return Err(Error::BadReplacement("invalid in this locale".to_owned()))
            }
            Prepared::Missing => unreachable!("missing replacement handled by call_setup"),
        };
        let want_caps = template.uses_groups && c.group_count() > 0;
        let char_fold = mode.is_char_mode();

        let mut out = TextVec::from_elems(Vec::with_capacity(x.len()));
        for (i, elem) in x.iter().enumerate() {
            ctx.check_interrupt()?;
            let subj = match normalize(elem, mode, locale) {
                Prepared::Missing => {
                    out.push(TextElem::Missing);
                    continue;
                }
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    out.push(TextElem::Missing);
                    continue;
                }
                Prepared::Ok(subj) => subj,
            };
            let bytes = subj.engine_bytes();

            let matches = if global {
                driver::all_matches(&mut c, bytes, mode, 0, want_caps, ctx, i)?
            } else {
                driver::first_match(&mut c, bytes, 0, want_caps, ctx, i)
                    .into_iter()
                    .collect()
            };
            if matches.is_empty() {
                out.push(elem.clone());
                continue;
            }

            let mut buf =
                Vec::with_capacity(bytes.len() + matches.len() * template.len_hint + 16);
            let mut cursor = 0;
            let mut last_end = None;
            for m in &matches {
                // one replacement per distinct match position: an empty
                // match abutting the previous match's end is copied, not
                // replaced
                if last_end.is_some_and(|e| m.end <= e) {
                    continue;
                }
                buf.extend_from_slice(&bytes[cursor..m.start]);
                template.emit(bytes, m, char_fold, &mut buf)?;
                cursor = m.end;
                last_end = Some(m.end);
            }
            buf.extend_from_slice(&bytes[cursor..]);

            out.push(tag_output(buf, mode, elem));
        }
        out.set_names(cloned_names(x));
        Ok(out)
    }
}
