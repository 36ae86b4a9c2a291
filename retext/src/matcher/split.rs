//! Tokenizing a vector around pattern matches.
//!
//! The split vector is recycled over the input. Non-empty matches are the
//! cut points; an empty match never cuts, the character it sits in front
//! of just stays in the current token. An empty split token means "split
//! into characters" (bytes, code points or wide characters, per mode),
//! and a missing split token passes the input element through whole.

use bon::Builder;

use crate::{
    context::Context,
    engine::{self, driver, Compiled},
    error::Result,
    matcher::{
        cloned_names,
        mode::{classify, Mode},
        subject::{normalize, Prepared, Subject},
        tag_output, Dialect, Matcher,
    },
    text::{TextElem, TextVec},
};

/// Flags for [`strsplit`]. `fixed` wins over `perl`, with a warning, like
/// everywhere else.
#[derive(Builder, Clone, Copy, Debug, Default)]
pub struct SplitOpts {
    #[builder(default = false)]
    pub fixed: bool,
    #[builder(default = false)]
    pub perl: bool,
    #[builder(default = false)]
    pub use_bytes: bool,
}

/// Result of [`strsplit`]: one vector of tokens per input element, names
/// of the input preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitResult {
    pub pieces: Vec<TextVec>,
    pub names: Option<Vec<String>>,
}

enum Tok {
    /// Missing split token: the element passes through whole.
    Missing,
    /// Empty split token: split into characters.
    Chars,
    Pat(Compiled),
}

impl Matcher {
    /// Splits each element of `x` around matches of this matcher's
    /// pattern: the single-token form of [`strsplit`]. `ignore_case`
    /// does not apply to splitting and is ignored here.
    pub fn split(&self, x: &TextVec, ctx: &mut Context) -> Result<Vec<TextVec>> {
        let opts = SplitOpts {
            fixed: self.fixed,
            perl: self.perl,
            use_bytes: self.use_bytes,
        };
        let split = TextVec::from_elems(vec![self.pattern.clone()]);
        Ok(strsplit(x, &split, &opts, ctx)?.pieces)
    }
}

/// Splits each element of `x` around matches of the recycled `split`
/// tokens.
pub fn strsplit(
    x: &TextVec,
    split: &TextVec,
    opts: &SplitOpts,
    ctx: &mut Context,
) -> Result<SplitResult> {
    ctx.begin_call();
    let mut perl = opts.perl;
    if opts.fixed && perl {
        ctx.warn("argument 'perl = TRUE' will be ignored");
        perl = false;
    }
    let dialect = if opts.fixed {
        Dialect::Literal
    } else if perl {
        Dialect::Perl
    } else {
        Dialect::Extended
    };
    let locale = ctx.locale();
    let mode = classify(dialect, opts.use_bytes, locale, &[], &[x, split]);

    // an empty split vector behaves like the empty token
    let mut toks = if split.is_empty() {
        vec![Tok::Chars]
    } else {
        split
            .iter()
            .map(|t| {
                Ok(match t.as_bytes() {
                    None => Tok::Missing,
                    Some([]) => Tok::Chars,
                    Some(_) => Tok::Pat(engine::compile(t, dialect, mode, false, locale)?),
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    let mut pieces = Vec::with_capacity(x.len());
    for (i, elem) in x.iter().enumerate() {
        ctx.check_interrupt()?;
        let idx = i % toks.len();
        let tok = &mut toks[idx];
        let piece = if elem.is_missing() {
            TextVec::from_elems(vec![TextElem::Missing])
        } else if let Tok::Missing = tok {
            TextVec::from_elems(vec![elem.clone()])
        } else {
            match normalize(elem, mode, locale) {
                Prepared::Missing => TextVec::from_elems(vec![TextElem::Missing]),
                Prepared::Invalid => {
                    ctx.warn_invalid_input(i);
                    TextVec::from_elems(vec![TextElem::Missing])
                }
                Prepared::Ok(subj) => match tok {
                    Tok::Chars => split_chars(&subj, mode, elem),
                    Tok::Pat(c) => split_around(c, &subj, mode, elem, ctx, i)?,
                    Tok::Missing => unreachable!("handled above"),
                },
            }
        };
        pieces.push(piece);
    }
    Ok(SplitResult { pieces, names: cloned_names(x) })
}

fn split_chars(subj: &Subject<'_>, mode: Mode, input: &TextElem) -> TextVec {
    match subj {
        Subject::Bytes(b) => b
            .iter()
            .map(|&byte| tag_output(vec![byte], mode, input))
            .collect(),
        Subject::Utf8(s) => s.chars().map(|c| TextElem::utf8(c.to_string())).collect(),
        Subject::Wide(w) => w.chars().map(|c| TextElem::utf8(c.to_string())).collect(),
    }
}

fn split_around(
    c: &mut Compiled,
    subj: &Subject<'_>,
    mode: Mode,
    input: &TextElem,
    ctx: &mut Context,
    elem: usize,
) -> Result<TextVec> {
    let bytes = subj.engine_bytes();
    let mut cuts: Vec<(usize, usize)> = Vec::new();
    let mut tok_start = 0;
    let mut at = 0;
    let mut last_at = None;
    while at <= bytes.len() {
        ctx.check_interrupt()?;
        if last_at.is_some_and(|prev| at <= prev) {
            break;
        }
        last_at = Some(at);
        match c.find_at(bytes, at) {
            Err(e) => {
                ctx.warn(format!("matching error for element {}: {}", elem + 1, e.0));
                break;
            }
            Ok(None) => break,
            Ok(Some((s, e))) if s == e => {
                // empty match: the next character joins the current token
                let width = driver::step(mode, bytes, s);
                if width == 0 {
                    break;
                }
                at = s + width;
            }
            Ok(Some((s, e))) => {
                cuts.push((tok_start, s));
                tok_start = e;
                at = e;
            }
        }
    }

    if cuts.is_empty() {
        // no split point: the whole subject, even when empty
        return Ok(TextVec::from_elems(vec![tag_output(
            bytes.to_vec(),
            mode,
            input,
        )]));
    }
    let mut out: Vec<TextElem> = cuts
        .iter()
        .map(|&(s, e)| tag_output(bytes[s..e].to_vec(), mode, input))
        .collect();
    if tok_start < bytes.len() {
        out.push(tag_output(bytes[tok_start..].to_vec(), mode, input));
    }
    Ok(TextVec::from_elems(out))
}
