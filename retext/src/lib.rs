/*!
Vectorized text search, split and substitution.

One pattern runs over a whole vector of tagged text values: membership
tests, first/all match positions (with capture groups), substitution with
back-references, tokenization, and raw-byte search. Three pattern
dialects share one pipeline:

- **literal**: plain substring scans, the fastest path;
- **extended**: POSIX-style regular expressions on a bounded
  backtracking engine;
- **perl**: Perl-compatible regular expressions on PCRE2, JIT compiled
  when available (cargo feature `perl`, on by default).

Each call picks an execution mode (`bytes`, `ascii`, `utf8` or the wide
path) from its inputs' encoding tags and the locale, and reports match
positions in characters unless byte semantics were forced. Missing values
propagate through every operation; per-element problems (undecodable
input, engine resource limits) become warnings on the [`Context`], never
call failures.
*/
//! ## Usage
//! ```
//! use retext::{Context, Matcher, TextVec};
//!
//! let mut ctx = Context::new();
//! let x = TextVec::from_strs(["grep", "grape", "prune"]);
//!
//! let m = Matcher::builder().build("gr(e|a)p".into());
//! assert_eq!(m.grep(&x, false, &mut ctx).unwrap(), vec![Some(1), Some(2)]);
//!
//! let r = m.regexpr(&x, &mut ctx).unwrap();
//! assert_eq!(r.start, vec![Some(1), Some(1), Some(-1)]);
//!
//! let out = Matcher::builder()
//!     .build("[aeu]".into())
//!     .gsub("_", &x, &mut ctx)
//!     .unwrap();
//! assert_eq!(out[1].as_str(), Some("gr_p_"));
//! ```
/*!
With the Perl dialect, capture groups flow into back-references and case
folding escapes:
```
use retext::{Context, Matcher, TextVec};

let mut ctx = Context::new();
let x = TextVec::from_strs(["hello world"]);
let m = Matcher::builder().perl(true).build(r"(\w+) (\w+)".into());
let out = m.gsub(r"\U\2\E \1", &x, &mut ctx).unwrap();
assert_eq!(out[0].as_str(), Some("WORLD hello"));
```

Splitting recycles a vector of separators, and raw-byte search works on
uninterpreted bytes:
```
use retext::{strsplit, Context, SplitOpts, TextVec};

let mut ctx = Context::new();
let r = strsplit(
    &TextVec::from_strs(["a,b,,c"]),
    &TextVec::from_strs([","]),
    &SplitOpts::builder().fixed(true).build(),
    &mut ctx,
)
.unwrap();
assert_eq!(r.pieces[0].len(), 4);
```
*/

pub mod context;
mod engine;
pub mod error;
pub mod matcher;
pub mod raw;
pub mod text;

pub use context::{Context, Locale};
pub use engine::{pcre_config, PcreConfig};
pub use error::{Error, Result};
pub use matcher::{
    strsplit, CaptureInfo, GregexprResult, IndexType, MatchList, Matcher, RegexecResult,
    RegexprResult, SplitOpts, SplitResult, MAX_RESULT_LEN,
};
pub use raw::{grep_raw, RawQuery, RawResult};
pub use text::{Encoding, TextElem, TextVec};

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &TextVec) -> Vec<&str> {
        v.iter().map(|e| e.as_str().unwrap()).collect()
    }

    #[test]
    fn split_then_join_round_trip() {
        let mut ctx = Context::new();
        let sep = ",";
        for s in ["a,b,,c", "plain", "", "x,y"] {
            let r = strsplit(
                &TextVec::from_strs([s]),
                &TextVec::from_strs([sep]),
                &SplitOpts::builder().fixed(true).build(),
                &mut ctx,
            )
            .unwrap();
            assert_eq!(strs(&r.pieces[0]).join(sep), s);
        }
    }

    #[test]
    fn substituting_the_match_is_identity() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["hello"]);
        let q = Matcher::builder().build("l+".into());
        let r = q.gsub("ll", &x, &mut ctx).unwrap();
        assert_eq!(r[0].as_str(), Some("hello"));
    }

    #[test]
    fn position_consistency() {
        let mut ctx = Context::new();
        let hay = "une idée fixe";
        let x = TextVec::from_strs([hay]);
        let q = Matcher::builder().build("idé+e".into());
        let r = q.regexpr(&x, &mut ctx).unwrap();
        let (pos, len) = (r.start[0].unwrap(), r.length[0].unwrap());
        assert!(pos >= 1);
        let sub: String = hay
            .chars()
            .skip(pos as usize - 1)
            .take(len as usize)
            .collect();
        assert_eq!(sub, "idée");
        // and the extracted substring still matches
        assert_eq!(
            q.grepl(&TextVec::from_strs([sub.as_str()]), &mut ctx).unwrap(),
            vec![Some(true)]
        );
    }

    #[test]
    fn grep_and_grepl_agree() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["axe", "box", "cat", "axiom"]);
        let q = Matcher::builder().build("^a".into());
        let flags = q.grepl(&x, &mut ctx).unwrap();
        let idx = q.grep(&x, false, &mut ctx).unwrap();
        let from_flags: Vec<Option<i32>> = flags
            .iter()
            .enumerate()
            .filter(|(_, hit)| **hit == Some(true))
            .map(|(i, _)| Some(i as i32 + 1))
            .collect();
        assert_eq!(idx, from_flags);
    }

    #[test]
    fn byte_char_duality() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["ééz"]);
        let chars = Matcher::builder().build("z".into());
        let r = chars.regexpr(&x, &mut ctx).unwrap();
        assert_eq!((r.start[0], r.use_bytes), (Some(3), false));
        let bytes = Matcher::builder().use_bytes(true).build("z".into());
        let r = bytes.regexpr(&x, &mut ctx).unwrap();
        assert_eq!((r.start[0], r.use_bytes), (Some(5), true));
    }

    #[test]
    fn latin1_inputs_match_utf8_patterns() {
        let mut ctx = Context::new();
        let x = TextVec::from_elems(vec![TextElem::latin1(b"caf\xe9".to_vec())]);
        let q = Matcher::builder().build("é$".into());
        assert_eq!(q.grepl(&x, &mut ctx).unwrap(), vec![Some(true)]);
        let r = q.regexpr(&x, &mut ctx).unwrap();
        assert_eq!(r.start, vec![Some(4)]);
    }

    #[test]
    fn cancellation_aborts_the_call() {
        use std::sync::{atomic::AtomicBool, Arc};

        let mut ctx = Context::new();
        ctx.set_cancel_flag(Arc::new(AtomicBool::new(true)));
        let x = TextVec::from_strs(["a", "b"]);
        let q = Matcher::builder().build("a".into());
        assert!(matches!(q.grep(&x, false, &mut ctx), Err(Error::Interrupted)));
    }

    #[test]
    fn pcre_config_shape() {
        let cfg = pcre_config();
        #[cfg(feature = "perl")]
        {
            assert!(cfg.utf8);
            assert!(cfg.unicode_properties);
        }
        #[cfg(not(feature = "perl"))]
        {
            assert!(!cfg.utf8);
            assert!(!cfg.jit);
        }
        assert!(!cfg.stack);
    }

    #[cfg(not(feature = "perl"))]
    #[test]
    fn perl_flag_without_engine_errors() {
        let mut ctx = Context::new();
        let x = TextVec::from_strs(["a"]);
        let q = Matcher::builder().perl(true).build("a".into());
        assert!(matches!(q.grep(&x, false, &mut ctx), Err(Error::PerlUnavailable)));
    }
}
