//! Best-effort side effects
//!
//! Auxiliary calls (cache mirroring, notifications, remote clean-up) must never
//! change the outcome of the primary operation. Wrapping them in [`attempt`]
//! makes that explicit at the call site.

use std::fmt::Display;
use std::future::Future;

/// Await `fut`; on failure log a warning tagged with `operation` and return `None`.
pub async fn attempt<F, T, E>(operation: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Best-effort operation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_value_through() {
        let value = attempt("ok", async { Ok::<_, String>(7) }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let value: Option<()> = attempt("fails", async { Err("down".to_string()) }).await;
        assert!(value.is_none());
    }
}
