//! # Request Scopes
//!
//! A view owns a [`RequestScope`]. Each fetch it starts takes a
//! [`RequestToken`]; starting a newer fetch, calling
//! [`RequestScope::invalidate`], or dropping the scope makes older tokens
//! stale. Work guarded by a stale token is abandoned and its result is never
//! handed back, so a retried or abandoned view cannot apply old data.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use tokio::sync::Notify;
use uuid::Uuid;

struct ScopeState {
    generation: AtomicU64,
    changed: Notify,
}

pub struct RequestScope {
    state: Arc<ScopeState>,
}

#[derive(Clone)]
pub struct RequestToken {
    id: Uuid,
    generation: u64,
    state: Arc<ScopeState>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ScopeState {
                generation: AtomicU64::new(0),
                changed: Notify::new(),
            }),
        }
    }

    /// Starts a new request, making every earlier token stale.
    pub fn begin(&self) -> RequestToken {
        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.changed.notify_waiters();
        let token = RequestToken {
            id: Uuid::new_v4(),
            generation,
            state: Arc::clone(&self.state),
        };
        debug!("Request {} started (generation {})", token.id, generation);
        token
    }

    /// Makes every outstanding token stale without starting a new request.
    pub fn invalidate(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.state.changed.notify_waiters();
    }

    /// Runs `fut` under a fresh token. Returns `None` if the scope moved on
    /// before it finished.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        self.begin().guard(fut).await
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.invalidate();
    }
}

impl RequestToken {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.state.generation.load(Ordering::SeqCst) == self.generation
    }

    /// Resolves once this token goes stale.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so an invalidation in between is not missed
            let notified = self.state.changed.notified();
            if !self.is_current() {
                return;
            }
            notified.await;
        }
    }

    /// Drives `fut` until it completes or the token goes stale.
    pub async fn guard<F: Future>(self, fut: F) -> Option<F::Output> {
        tokio::select! {
            out = fut => {
                if self.is_current() {
                    Some(out)
                } else {
                    debug!("Request {} finished after it went stale, discarding", self.id);
                    None
                }
            }
            _ = self.cancelled() => {
                debug!("Request {} cancelled", self.id);
                None
            }
        }
    }
}

impl std::fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestToken")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_run_returns_result_when_current() {
        let scope = RequestScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[test]
    fn test_begin_invalidates_older_tokens() {
        let scope = RequestScope::new();
        let first = scope.begin();
        let second = scope.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_drop_invalidates() {
        let scope = RequestScope::new();
        let token = scope.begin();
        drop(scope);
        assert!(!token.is_current());
    }

    #[tokio::test]
    async fn test_invalidate_cancels_in_flight_work() {
        let scope = RequestScope::new();
        let token = scope.begin();
        let (_tx, rx) = oneshot::channel::<u8>();

        let handle = tokio::spawn(token.guard(rx));
        scope.invalidate();

        assert_eq!(handle.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_retry_discards_stale_response() {
        let scope = RequestScope::new();
        let stale = scope.begin();
        let (tx, rx) = oneshot::channel::<&str>();
        let handle = tokio::spawn(stale.guard(rx));

        // User hits retry before the first response lands
        let fresh = scope.begin();
        let _ = tx.send("old");

        assert_eq!(handle.await.unwrap(), None);
        assert_eq!(fresh.guard(async { "new" }).await, Some("new"));
    }
}
