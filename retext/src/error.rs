//! Call-fatal errors.
//!
//! Only conditions that abort a whole call are errors: a pattern that does
//! not compile, a substitution result outgrowing its hard cap, a bad raw
//! offset, cooperative cancellation. Everything per-element (invalid
//! input, engine resource limits, odd flag combinations) is a warning
//! through the [`Context`](crate::context::Context) sink and the call
//! keeps going.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The pattern did not compile; carries the pattern and the engine's
    /// reason.
    BadPattern { pattern: String, reason: String },
    /// The replacement text is not usable in the chosen mode.
    BadReplacement(String),
    /// A substitution result would exceed the output cap.
    ResultTooLong,
    /// Out-of-range `offset` for a raw search.
    InvalidOffset(usize),
    /// The call was cancelled through the context's cancellation flag.
    Interrupted,
    /// A Perl-dialect operation was requested but the `perl` feature is
    /// compiled out.
    PerlUnavailable,
    /// The operation does not support the requested flag combination.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadPattern { pattern, reason } => {
                write!(f, "invalid regular expression '{pattern}', reason '{reason}'")
            }
            Error::BadReplacement(reason) => {
                write!(f, "invalid 'replacement' argument, reason '{reason}'")
            }
            Error::ResultTooLong => write!(f, "result string is too long"),
            Error::InvalidOffset(off) => write!(f, "invalid 'offset' argument ({off})"),
            Error::Interrupted => write!(f, "operation was interrupted"),
            Error::PerlUnavailable => {
                write!(f, "Perl-compatible patterns are not supported in this build")
            }
            Error::Unsupported(what) => write!(f, "{what}"),
        }
    }
}

impl std::error::Error for Error {}
