//! Explicit best-effort results.
//!
//! Several lookups never fail but may fall back to partial or zero-valued
//! data (filename heuristics, sub-version parsing). [`Outcome`] keeps that
//! distinction visible to callers instead of hiding it behind a default.

/// A value that was either fully resolved or produced by a fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The value was derived from authoritative or well-formed input.
    Resolved(T),
    /// The value is a fallback (partial, empty, or zeroed).
    Degraded(T),
}

impl<T> Outcome<T> {
    /// Whether the fallback path was taken.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Borrow the carried value regardless of how it was produced.
    pub fn value(&self) -> &T {
        match self {
            Self::Resolved(v) | Self::Degraded(v) => v,
        }
    }

    /// Take the carried value regardless of how it was produced.
    pub fn into_value(self) -> T {
        match self {
            Self::Resolved(v) | Self::Degraded(v) => v,
        }
    }
}
