//! The vectorized pattern matcher and its operations.
//!
//! A [`Matcher`] bundles a pattern with the four call flags. Each
//! operation picks an execution mode from its actual inputs, compiles the
//! pattern for that mode, and walks the vector element by element; the
//! compiled pattern never outlives the operation.

use bon::bon;

pub(crate) mod mode;
pub(crate) mod subject;

mod find;
mod replace;
mod result;
mod split;

pub use replace::MAX_RESULT_LEN;
pub use result::{CaptureInfo, GregexprResult, IndexType, MatchList, RegexecResult, RegexprResult};
pub use split::{strsplit, SplitOpts, SplitResult};

use crate::{
    context::Context,
    engine::{self, Compiled},
    error::Result,
    matcher::mode::{classify, Mode},
    text::{TextElem, TextVec},
};

pub(crate) fn cloned_names(x: &TextVec) -> Option<Vec<String>> {
    x.names().map(<[String]>::to_vec)
}

/// Tags a produced byte string for the mode it was produced under:
/// character modes yield UTF-8-tagged text, ASCII mode keeps the ASCII
/// tag, and byte mode inherits the input element's tag.
pub(crate) fn tag_output(buf: Vec<u8>, mode: Mode, input: &TextElem) -> TextElem {
    use crate::text::Encoding;

    match mode {
        Mode::Utf8 | Mode::Wide => match String::from_utf8(buf) {
            Ok(s) => TextElem::utf8(s),
            Err(e) => TextElem::bytes(e.into_bytes()),
        },
        Mode::Ascii => TextElem::Str { bytes: buf, enc: Encoding::Ascii },
        Mode::Bytes => TextElem::Str {
            bytes: buf,
            enc: input.enc().unwrap_or(Encoding::Unknown),
        },
    }
}

/// Pattern syntax family a call executes under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dialect {
    Literal,
    Extended,
    Perl,
}

/// A pattern plus the flags that select its dialect and semantics.
///
/// ## Flags
/// `fixed` selects the literal dialect and wins over the other flags:
/// combining it with `perl` or `ignore_case` warns and clears the weaker
/// flag, once per operation invocation. `use_bytes` forces byte semantics
/// regardless of input tags.
///
/// ## Example
/// ```
/// use retext::{Context, Matcher, TextVec};
///
/// let mut ctx = Context::new();
/// let m = Matcher::builder().build("^x".into());
/// let x = TextVec::from_strs(["x1", "y", "xx"]);
/// let hits = m.grep(&x, false, &mut ctx).unwrap();
/// assert_eq!(hits, vec![Some(1), Some(3)]);
/// ```
#[derive(Clone, Debug)]
pub struct Matcher {
    pattern: TextElem,
    ignore_case: bool,
    perl: bool,
    fixed: bool,
    use_bytes: bool,
}

#[bon]
impl Matcher {
    #[builder]
    pub fn new(
        #[builder(finish_fn)] pattern: TextElem,

        /// Case-insensitive matching. Cleared (with a warning) when
        /// `fixed` is set.
        #[builder(default = false)]
        ignore_case: bool,

        /// Use the Perl-compatible dialect. Cleared (with a warning) when
        /// `fixed` is set.
        #[builder(default = false)]
        perl: bool,

        /// Treat the pattern as a literal string.
        #[builder(default = false)]
        fixed: bool,

        /// Force byte semantics regardless of input encoding tags.
        #[builder(default = false)]
        use_bytes: bool,
    ) -> Self {
        Matcher { pattern, ignore_case, perl, fixed, use_bytes }
    }
}

impl Matcher {
    pub fn pattern(&self) -> &TextElem {
        &self.pattern
    }

    /// Resolves the flag combination for one invocation, warning about
    /// and clearing whatever `fixed` overrides.
    pub(crate) fn effective(&self, ctx: &mut Context) -> (Dialect, bool) {
        let mut perl = self.perl;
        let mut ignore_case = self.ignore_case;
        if self.fixed {
            if perl {
                ctx.warn("argument 'perl = TRUE' will be ignored");
                perl = false;
            }
            if ignore_case {
                ctx.warn("argument 'ignore.case = TRUE' will be ignored");
                ignore_case = false;
            }
        }
        let dialect = if self.fixed {
            Dialect::Literal
        } else if perl {
            Dialect::Perl
        } else {
            Dialect::Extended
        };
        (dialect, ignore_case)
    }

    /// Common operation entry: flag repair, mode selection, compilation.
    /// Returns `None` when the pattern (or replacement) is missing, in
    /// which case the operation produces its all-missing result.
    pub(crate) fn call_setup(
        &self,
        replacement: Option<&TextElem>,
        x: &TextVec,
        ctx: &mut Context,
    ) -> Result<Option<(Mode, Dialect, Compiled)>> {
        ctx.begin_call();
        let (dialect, ignore_case) = self.effective(ctx);
        if self.pattern.is_missing() || replacement.is_some_and(TextElem::is_missing) {
            return Ok(None);
        }
        let mut fixed_inputs = vec![&self.pattern];
        if let Some(repl) = replacement {
            fixed_inputs.push(repl);
        }
        let mode = classify(dialect, self.use_bytes, ctx.locale(), &fixed_inputs, &[x]);
        let compiled = engine::compile(&self.pattern, dialect, mode, ignore_case, ctx.locale())?;
        Ok(Some((mode, dialect, compiled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_wins_with_warnings() {
        let mut ctx = Context::new();
        let m = Matcher::builder()
            .fixed(true)
            .perl(true)
            .ignore_case(true)
            .build("a.b".into());
        let (dialect, ignore_case) = m.effective(&mut ctx);
        assert_eq!(dialect, Dialect::Literal);
        assert!(!ignore_case);
        assert_eq!(
            ctx.warnings(),
            [
                "argument 'perl = TRUE' will be ignored",
                "argument 'ignore.case = TRUE' will be ignored"
            ]
        );
    }

    #[test]
    fn flag_warnings_repeat_per_call() {
        let mut ctx = Context::new();
        let m = Matcher::builder().fixed(true).perl(true).build("a".into());
        let x = TextVec::from_strs(["a"]);
        m.grepl(&x, &mut ctx).unwrap();
        m.grepl(&x, &mut ctx).unwrap();
        assert_eq!(ctx.warnings().len(), 2);
    }
}
