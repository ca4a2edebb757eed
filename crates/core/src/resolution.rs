//! Two-variant resolution outcome for collaborator fetches.
//!
//! Soft subsystem failures are data, not faults: a bounded fetch always
//! yields a usable value, and the pipeline branches on whether it is fresh
//! or a substituted fallback. This keeps degradation testable without
//! catch-style control flow.

/// Why a fallback value was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    /// The collaborator did not answer within its deadline.
    Timeout {
        /// The deadline that expired, in milliseconds.
        waited_ms: u64,
    },
    /// The collaborator answered with an error.
    Error(String),
}

impl std::fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { waited_ms } => write!(f, "timed out after {waited_ms}ms"),
            Self::Error(msg) => write!(f, "{msg}"),
        }
    }
}

/// The outcome of one bounded collaborator fetch.
#[derive(Debug, Clone)]
pub enum Resolution<T> {
    /// The collaborator answered in time.
    Fresh(T),
    /// A fallback value was substituted; the cause says why.
    Fallback { value: T, cause: FallbackCause },
}

impl<T> Resolution<T> {
    /// Whether this resolution degraded to a fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Borrow the carried value, fresh or fallback.
    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(v) => v,
            Self::Fallback { value, .. } => value,
        }
    }

    /// Split into the value and the optional fallback cause.
    pub fn into_parts(self) -> (T, Option<FallbackCause>) {
        match self {
            Self::Fresh(v) => (v, None),
            Self::Fallback { value, cause } => (value, Some(cause)),
        }
    }
}
