//! Searching uninterpreted byte sequences.
//!
//! Pattern and haystack are opaque bytes: embedded NULs are fine, and the
//! non-literal dialect is the extended syntax compiled in byte mode.
//! Positions are 1-based byte offsets.

use bon::Builder;
use itertools::Itertools;

use crate::{
    context::Context,
    engine::{self, driver},
    error::{Error, Result},
    matcher::{mode::Mode, Dialect},
    text::TextElem,
};

/// A raw-bytes search, built over `(pattern, haystack)`.
///
/// ## Output shape
/// - `value = false`: 1-based match start positions (first, or with
///   `all`, every one).
/// - `value = true`: the matched bytes (first match), or with `all` one
///   byte vector per match.
/// - `invert = true` (requires `value`): the complement, i.e. the byte ranges
///   *between* matches, from the search offset to the end.
///
/// ## Example
/// ```
/// use retext::{Context, RawQuery, RawResult};
///
/// let mut ctx = Context::new();
/// let hay = [0xff, 0x00, 0x01, 0x00, 0x01, 0x02];
/// let q = RawQuery::builder(&[0x00, 0x01], &hay).all(true).build();
/// match q.exec(&mut ctx).unwrap() {
///     RawResult::Positions(p) => assert_eq!(p, vec![2, 4]),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Builder, Clone, Copy, Debug)]
pub struct RawQuery<'a> {
    #[builder(start_fn)]
    pattern: &'a [u8],
    #[builder(start_fn)]
    haystack: &'a [u8],

    /// 1-based byte offset the search starts at.
    #[builder(default = 1)]
    offset: usize,

    /// ASCII-caseless matching. Cleared (with a warning) when `fixed` is
    /// set.
    #[builder(default = false)]
    ignore_case: bool,

    /// Treat the pattern bytes as a literal needle.
    #[builder(default = false)]
    fixed: bool,

    /// Return matched bytes instead of positions.
    #[builder(default = false)]
    value: bool,

    /// Report every match, not just the first.
    #[builder(default = false)]
    all: bool,

    /// Return the complement byte ranges. Only meaningful with `value`;
    /// otherwise warned about and cleared.
    #[builder(default = false)]
    invert: bool,
}

/// Runs a raw-bytes search: the free-function form of
/// [`RawQuery::exec`].
///
/// ```
/// use retext::{grep_raw, Context, RawQuery, RawResult};
///
/// let mut ctx = Context::new();
/// let q = RawQuery::builder(b"a", b"xaya").all(true).build();
/// assert_eq!(
///     grep_raw(q, &mut ctx).unwrap(),
///     RawResult::Positions(vec![2, 4]),
/// );
/// ```
pub fn grep_raw(query: RawQuery<'_>, ctx: &mut Context) -> Result<RawResult> {
    query.exec(ctx)
}

/// Result of a [`RawQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawResult {
    /// 1-based match start positions.
    Positions(Vec<usize>),
    /// Matched bytes of the first match; empty when there was none.
    Bytes(Vec<u8>),
    /// One byte vector per match (or per complement range, with
    /// `invert`).
    Pieces(Vec<Vec<u8>>),
}

impl RawQuery<'_> {
    pub fn exec(&self, ctx: &mut Context) -> Result<RawResult> {
        ctx.begin_call();
        if self.offset < 1 || self.offset > self.haystack.len() + 1 {
            return Err(Error::InvalidOffset(self.offset));
        }
        let from = self.offset - 1;

        let mut ignore_case = self.ignore_case;
        if self.fixed && ignore_case {
            ctx.warn("argument 'ignore.case = TRUE' will be ignored");
            ignore_case = false;
        }
        let mut invert = self.invert;
        if invert && !self.value {
            ctx.warn("argument 'invert = TRUE' is ignored unless 'value = TRUE'");
            invert = false;
        }

        let pattern = TextElem::bytes(self.pattern.to_vec());
        let dialect = if self.fixed { Dialect::Literal } else { Dialect::Extended };
        let mut c = engine::compile(&pattern, dialect, Mode::Bytes, ignore_case, ctx.locale())?;

        let matches = if self.all {
            driver::all_matches(&mut c, self.haystack, Mode::Bytes, from, false, ctx, 0)?
        } else {
            driver::first_match(&mut c, self.haystack, from, false, ctx, 0)
                .into_iter()
                .collect_vec()
        };

        Ok(if invert {
            let mut pieces = Vec::with_capacity(matches.len() + 1);
            let mut prev = from;
            for m in &matches {
                pieces.push(self.haystack[prev..m.start].to_vec());
                prev = m.end;
            }
            pieces.push(self.haystack[prev..].to_vec());
            RawResult::Pieces(pieces)
        } else if self.value {
            if self.all {
                RawResult::Pieces(
                    matches
                        .iter()
                        .map(|m| self.haystack[m.start..m.end].to_vec())
                        .collect(),
                )
            } else {
                RawResult::Bytes(
                    matches
                        .first()
                        .map(|m| self.haystack[m.start..m.end].to_vec())
                        .unwrap_or_default(),
                )
            }
        } else {
            RawResult::Positions(matches.iter().map(|m| m.start + 1).collect())
        })
    }
}
