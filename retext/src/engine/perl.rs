//! The Perl-compatible dialect, driven by PCRE2.
//!
//! UTF and UCP flags track the execution mode: character-mode calls get
//! Unicode-aware classes and case folding, byte-mode calls get plain byte
//! semantics. JIT compilation is attempted and silently falls back; the
//! JIT stack ceiling is read once per process from
//! `PCRE_JIT_STACK_MAXSIZE` (floating-point megabytes, clamped to
//! `[0, 1000]`, default 64).

use std::sync::OnceLock;

use log::{debug, warn};
use pcre2::bytes::{CaptureLocations, Regex, RegexBuilder};

use crate::{
    engine::{CapSpans, EngineError, PcreConfig},
    error::{Error, Result},
    matcher::mode::Mode,
};

pub(crate) struct Perl {
    re: Regex,
    locs: CaptureLocations,
    names: Vec<Option<String>>,
}

impl Perl {
    pub fn compile(pattern: &str, mode: Mode, ignore_case: bool) -> Result<Self> {
        let utf = mode == Mode::Utf8;
        let mut builder = RegexBuilder::new();
        builder
            .caseless(ignore_case)
            .utf(utf)
            .ucp(utf)
            .jit_if_available(true)
            .max_jit_stack_size(Some(jit_stack_max_size()));
        let re = builder.build(pattern).map_err(|e| Error::BadPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })?;
        debug!("compiled perl-dialect pattern, utf={utf}");
        let locs = re.capture_locations();
        let names = re.capture_names().to_vec();
        Ok(Perl { re, locs, names })
    }

    /// Number of capture groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.locs.len().saturating_sub(1)
    }

    /// Names of groups `1..`, in index order; unnamed groups report an
    /// empty string.
    pub fn group_names(&self) -> Vec<String> {
        (1..self.locs.len())
            .map(|i| self.names.get(i).and_then(Clone::clone).unwrap_or_default())
            .collect()
    }

    pub fn find_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<(usize, usize)>, EngineError> {
        self.re
            .find_at(hay, at)
            .map(|m| m.map(|m| (m.start(), m.end())))
            .map_err(EngineError::new)
    }

    pub fn captures_at(
        &mut self,
        hay: &[u8],
        at: usize,
    ) -> std::result::Result<Option<CapSpans>, EngineError> {
        let m = self
            .re
            .captures_read_at(&mut self.locs, hay, at)
            .map_err(EngineError::new)?;
        let Some(m) = m else { return Ok(None) };
        let groups = (1..self.locs.len()).map(|i| self.locs.get(i)).collect();
        Ok(Some(CapSpans { full: (m.start(), m.end()), groups }))
    }
}

/// Engine facts reported by [`crate::pcre_config`].
pub(crate) fn runtime_config() -> PcreConfig {
    PcreConfig {
        utf8: true,
        unicode_properties: true,
        jit: pcre2::is_jit_available(),
        // matching runs on the heap, never on C-stack recursion
        stack: false,
    }
}

const DEFAULT_JIT_STACK_MB: f64 = 64.0;

/// Ceiling for the JIT stack, in megabytes, when the environment asks for
/// one. Out-of-range and unparsable values are rejected.
fn parse_jit_stack_mb(raw: &str) -> Option<f64> {
    let mb = raw.trim().parse::<f64>().ok()?;
    (0.0..=1000.0).contains(&mb).then_some(mb)
}

/// The per-process JIT stack ceiling in bytes, read from
/// `PCRE_JIT_STACK_MAXSIZE` exactly once.
fn jit_stack_max_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| {
        let mb = match std::env::var("PCRE_JIT_STACK_MAXSIZE") {
            Ok(raw) => parse_jit_stack_mb(&raw).unwrap_or_else(|| {
                warn!("ignoring invalid PCRE_JIT_STACK_MAXSIZE value {raw:?}");
                DEFAULT_JIT_STACK_MB
            }),
            Err(_) => DEFAULT_JIT_STACK_MB,
        };
        (mb * 1024.0 * 1024.0) as usize
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jit_stack_parsing() {
        assert_eq!(parse_jit_stack_mb("64"), Some(64.0));
        assert_eq!(parse_jit_stack_mb(" 0.5 "), Some(0.5));
        assert_eq!(parse_jit_stack_mb("0"), Some(0.0));
        assert_eq!(parse_jit_stack_mb("1000"), Some(1000.0));
        assert_eq!(parse_jit_stack_mb("1001"), None);
        assert_eq!(parse_jit_stack_mb("-1"), None);
        assert_eq!(parse_jit_stack_mb("lots"), None);
    }

    #[test]
    fn utf_mode_flags() {
        let mut p = Perl::compile(r"(\w)(\d)?", Mode::Utf8, false).unwrap();
        assert_eq!(p.group_count(), 2);
        let m = p.captures_at("é7".as_bytes(), 0).unwrap().unwrap();
        assert_eq!(m.full, (0, 3));
        assert_eq!(m.groups, vec![Some((0, 2)), Some((2, 3))]);
    }

    #[test]
    fn caseless() {
        let mut p = Perl::compile("abc", Mode::Ascii, true).unwrap();
        assert_eq!(p.find_at(b"xABC", 0).unwrap(), Some((1, 4)));
    }

    #[test]
    fn named_groups() {
        let p = Perl::compile(r"(?<year>\d{4})-(\d{2})", Mode::Ascii, false).unwrap();
        assert_eq!(p.group_names(), vec!["year".to_string(), String::new()]);
    }

    #[test]
    fn bad_pattern() {
        assert!(matches!(
            Perl::compile("(", Mode::Ascii, false),
            Err(Error::BadPattern { .. })
        ));
    }

    #[test]
    fn config_reports_heap_matching() {
        let cfg = runtime_config();
        assert!(cfg.utf8);
        assert!(cfg.unicode_properties);
        assert!(!cfg.stack);
    }
}
