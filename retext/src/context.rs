//! Per-call host state: locale, warning sink, cancellation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{Error, Result};

/// Character encoding of the host's locale.
///
/// Determines how native (`Unknown`-tagged) text is interpreted and
/// whether Latin-1-tagged inputs are up-converted. Non-UTF-8 multibyte
/// locales are not representable; the host is expected to hand over
/// tagged bytes instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    /// Single-byte, ASCII-only interpretation of native text.
    C,
    /// Native text is Latin-1.
    Latin1,
    /// Native text is UTF-8.
    #[default]
    Utf8,
}

impl Locale {
    pub fn is_utf8(self) -> bool {
        matches!(self, Locale::Utf8)
    }

    pub fn is_latin1(self) -> bool {
        matches!(self, Locale::Latin1)
    }

    /// Whether the native encoding is multibyte.
    pub fn is_multibyte(self) -> bool {
        self.is_utf8()
    }
}

/// Maximum number of invalid-input warnings reported per call; further
/// invalid elements are still skipped, silently.
const MAX_INVALID_WARNINGS: usize = 5;

/// Host state threaded through every operation: the locale, a warning
/// sink, and an optional cooperative-cancellation flag.
///
/// Warnings accumulate across calls until drained with
/// [`Context::take_warnings`]. Cancellation is checked between elements
/// and between match iterations; a raised flag aborts the running call
/// with [`Error::Interrupted`] and per-call resources are released on the
/// way out.
#[derive(Clone, Debug, Default)]
pub struct Context {
    locale: Locale,
    warnings: Vec<String>,
    invalid_reported: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl Context {
    /// A context for the default (UTF-8) locale.
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with_locale(locale: Locale) -> Self {
        Context { locale, ..Context::default() }
    }

    /// Installs a cancellation flag. Setting the flag to `true` makes the
    /// running call return [`Error::Interrupted`] at its next check.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Warnings emitted so far, oldest first.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drains accumulated warnings.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Rate-limited invalid-input warning; `index` is 0-based.
    pub(crate) fn warn_invalid_input(&mut self, index: usize) {
        if self.invalid_reported < MAX_INVALID_WARNINGS {
            self.invalid_reported += 1;
            self.warn(format!("input string {} is invalid in this locale", index + 1));
        }
    }

    /// Resets per-call warning limits. Called at operation entry.
    pub(crate) fn begin_call(&mut self) {
        self.invalid_reported = 0;
    }

    pub(crate) fn check_interrupt(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_warning_cap() {
        let mut ctx = Context::new();
        ctx.begin_call();
        for i in 0..10 {
            ctx.warn_invalid_input(i);
        }
        assert_eq!(ctx.warnings().len(), 5);
        // the cap applies per call
        ctx.begin_call();
        ctx.warn_invalid_input(0);
        assert_eq!(ctx.warnings().len(), 6);
    }

    #[test]
    fn interrupt_flag() {
        let mut ctx = Context::new();
        assert!(ctx.check_interrupt().is_ok());
        let flag = Arc::new(AtomicBool::new(false));
        ctx.set_cancel_flag(flag.clone());
        assert!(ctx.check_interrupt().is_ok());
        flag.store(true, Ordering::Relaxed);
        assert_eq!(ctx.check_interrupt(), Err(Error::Interrupted));
    }
}
