//! Result shapes handed back to the host.
//!
//! Integer cells are `Option<i32>`: `None` is the missing value,
//! `Some(-1)` means "no match", anything else is a 1-based position.
//! Whether positions count bytes or characters is recorded on the result
//! (`index_type`/`use_bytes`) rather than left for the caller to infer.

/// Unit of the positions in a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexType {
    Bytes,
    Chars,
}

/// Capture positions for a first-match operation, parallel to the match
/// vectors: one row per element, one column per capture group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureInfo {
    /// Group names in index order; unnamed groups are empty strings.
    pub names: Vec<String>,
    /// `start[elem][group]`, 1-based; `Some(-1)` for unset groups, `None`
    /// rows for missing elements.
    pub start: Vec<Vec<Option<i32>>>,
    pub length: Vec<Vec<Option<i32>>>,
}

/// Result of a first-match query over a vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexprResult {
    /// 1-based start of the first match per element.
    pub start: Vec<Option<i32>>,
    /// Match length per element, in the units of `index_type`.
    pub length: Vec<Option<i32>>,
    pub index_type: IndexType,
    pub use_bytes: bool,
    /// Present for Perl-dialect patterns with at least one capture group.
    pub captures: Option<CaptureInfo>,
}

/// Matches within a single element: parallel start/length vectors, plus
/// per-match capture rows when captures were extracted. `[-1]`/`[-1]`
/// encodes "no match in this element".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchList {
    pub start: Vec<i32>,
    pub length: Vec<i32>,
    /// `capture_start[match][group]`; empty when captures were not
    /// requested.
    pub capture_start: Vec<Vec<i32>>,
    pub capture_length: Vec<Vec<i32>>,
}

/// Result of an all-matches query: one [`MatchList`] per element, `None`
/// for missing (or undecodable) elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GregexprResult {
    pub elems: Vec<Option<MatchList>>,
    /// Capture group names, when captures were extracted.
    pub capture_names: Option<Vec<String>>,
    pub index_type: IndexType,
    pub use_bytes: bool,
    /// Names of the input vector, preserved.
    pub names: Option<Vec<String>>,
}

/// Result of a whole-match-plus-groups query: per element, position 0 is
/// the whole match and positions 1.. are the capture groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexecResult {
    pub elems: Vec<Option<MatchList>>,
    pub index_type: IndexType,
    pub use_bytes: bool,
    pub names: Option<Vec<String>>,
}
