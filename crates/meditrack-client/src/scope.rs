//! Cancellable scopes tying network work to the view that issued it.
//!
//! Every dashboard owns one `ViewScope`. Requests run through
//! [`ViewScope::run`]; once the scope is cancelled (explicitly, via a
//! [`ScopeHandle`], or by dropping the view) pending requests resolve to
//! [`ClientError::Cancelled`] and their responses are discarded before they
//! can touch view state.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Cancellation scope owned by a view.
#[derive(Debug)]
pub struct ViewScope {
    name: &'static str,
    cancel: Arc<watch::Sender<bool>>,
    cancelled: watch::Receiver<bool>,
}

/// Cloneable handle that can cancel a scope from another task.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl ScopeHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

impl ViewScope {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            name,
            cancel: Arc::new(tx),
            cancelled: rx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            cancel: Arc::clone(&self.cancel),
        }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Drive `work` unless the scope is cancelled first.
    ///
    /// Cancellation wins a tie with completion, so a response that lands
    /// together with the cancel is still discarded.
    pub async fn run<F, T>(&self, work: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let mut cancelled = self.cancelled.clone();
        if *cancelled.borrow_and_update() {
            debug!(scope = self.name, "scope already cancelled");
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = wait_for_cancel(&mut cancelled) => {
                debug!(scope = self.name, "request cancelled");
                Err(ClientError::Cancelled)
            }
            result = work => result,
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

async fn wait_for_cancel(cancelled: &mut watch::Receiver<bool>) {
    loop {
        if *cancelled.borrow_and_update() {
            return;
        }
        if cancelled.changed().await.is_err() {
            // Sender gone without cancelling; nothing can cancel us now.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let scope = ViewScope::new("test");
        let value = scope.run(async { Ok::<_, ClientError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_scope_rejects_new_work() {
        let scope = ViewScope::new("test");
        scope.cancel();
        let result = scope.run(async { Ok::<_, ClientError>(7) }).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_handle_cancels_pending_work() {
        let scope = ViewScope::new("test");
        let handle = scope.handle();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let result = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ClientError>(())
            })
            .await;

        canceller.await.unwrap();
        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert!(scope.is_cancelled());
    }

    #[test]
    fn test_drop_cancels_handles() {
        let scope = ViewScope::new("test");
        let handle = scope.handle();
        assert!(!handle.is_cancelled());
        drop(scope);
        assert!(handle.is_cancelled());
    }
}
