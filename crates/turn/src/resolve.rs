//! Bounded-wait-with-fallback — the single fetch pattern for all soft
//! collaborators.
//!
//! The collaborator future races a deadline timer. On expiry or error the
//! future is dropped (best-effort cancellation; in-flight work may finish
//! on its own) and the precomputed fallback is substituted. There is never
//! a retry: for an interactive turn, falling back immediately is cheaper
//! than a second bounded wait.

use kindred_core::resolution::{FallbackCause, Resolution};
use std::future::Future;
use std::time::Duration;

/// Await `fetch` for at most `deadline`; on timeout or error substitute
/// `fallback()` and report why.
pub async fn bounded<T, E, F>(
    deadline: Duration,
    fetch: F,
    fallback: impl FnOnce() -> T,
) -> Resolution<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(deadline, fetch).await {
        Ok(Ok(value)) => Resolution::Fresh(value),
        Ok(Err(e)) => Resolution::Fallback {
            value: fallback(),
            cause: FallbackCause::Error(e.to_string()),
        },
        Err(_) => Resolution::Fallback {
            value: fallback(),
            cause: FallbackCause::Timeout {
                waited_ms: deadline.as_millis() as u64,
            },
        },
    }
}
