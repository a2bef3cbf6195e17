//! Fetch scopes: dropping the results of fetches a page no longer wants.
//!
//! A page view creates one [`FetchScope`], runs its loads through it and
//! cancels it on navigation. Results that arrive afterwards are discarded
//! instead of being applied to a view that is gone.

use backoffice_core::Result;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Cancellation boundary for the fetches of one page view.
#[derive(Debug, Clone, Default)]
pub struct FetchScope {
    token: CancellationToken,
}

impl FetchScope {
    /// Creates a live scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that is cancelled together with this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancels the scope. Idempotent.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("fetch scope cancelled");
        }
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `fetch` unless the scope is cancelled first.
    ///
    /// Resolves to `Ok(None)` when the scope is (or becomes) cancelled, and
    /// to the fetch's own result otherwise.
    pub async fn run<T, F>(&self, fetch: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = self.token.cancelled() => Ok(None),
            result = fetch => result.map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::Error;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_delivers_result_when_live() {
        let scope = FetchScope::new();

        let result = scope.run(async { Ok(42) }).await.expect("ok");

        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_run_propagates_errors() {
        let scope = FetchScope::new();

        let result: Result<Option<()>> = scope
            .run(async { Err(Error::FetchFailed("down".into())) })
            .await;

        assert!(matches!(result, Err(Error::FetchFailed(_))));
    }

    #[tokio::test]
    async fn test_cancelled_scope_discards_result() {
        // Arrange
        let scope = FetchScope::new();
        let handle = scope.clone();

        // Act
        let pending = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok("stale")
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        scope.cancel();

        // Assert
        let result = pending.await.expect("join").expect("ok");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_already_cancelled_scope_skips_fetch() {
        let scope = FetchScope::new();
        scope.cancel();
        scope.cancel();

        let result = scope.run(async { Ok(1) }).await.expect("ok");

        assert_eq!(result, None);
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = FetchScope::new();
        let child = parent.child();

        parent.cancel();

        assert!(child.is_cancelled());
    }
}
