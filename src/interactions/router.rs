//! Prefix-keyed interaction dispatch
//!
//! One router instance exists per interaction kind (component clicks,
//! modal submits). Handlers register under a unique token prefix during
//! the startup registration phase; after that the router is immutable
//! behind an `Arc` and dispatches concurrently.
//!
//! Dispatch races the handler body against the "initial response sent"
//! signal so the gateway event is acknowledged as soon as Discord has its
//! answer, while the handler is still awaited to completion so its errors
//! are never dropped.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use uuid::Uuid;

use super::error::InteractionError;
use super::keys;
use super::response::ResponseState;

/// A context that participates in the response lifecycle.
pub trait RoutedContext: Send + Sync + 'static {
    /// The shared response state for this interaction.
    fn response_state(&self) -> Arc<ResponseState>;
}

/// Handler for one family of interactions, selected by token prefix.
#[async_trait]
pub trait InteractionHandler<C: RoutedContext>: Send + Sync {
    /// The token prefix this handler owns.
    fn prefix(&self) -> &'static str;

    /// Handle one interaction.
    async fn handle(&self, ctx: Arc<C>) -> Result<()>;
}

/// Dispatch table from token prefix to handler.
pub struct InteractionRouter<C: RoutedContext> {
    handlers: HashMap<&'static str, Arc<dyn InteractionHandler<C>>>,
}

impl<C: RoutedContext> InteractionRouter<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its declared prefix.
    ///
    /// Duplicate prefixes are a registration bug and fail hard.
    pub fn register(
        &mut self,
        handler: Arc<dyn InteractionHandler<C>>,
    ) -> Result<(), InteractionError> {
        let prefix = handler.prefix();
        if self.handlers.contains_key(prefix) {
            return Err(InteractionError::DuplicateHandler(prefix.to_string()));
        }

        self.handlers.insert(prefix, handler);
        Ok(())
    }

    /// Remove a handler. No-op if the prefix was never registered.
    pub fn unregister(&mut self, prefix: &str) {
        self.handlers.remove(prefix);
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch an interaction to the handler owning its token prefix.
    ///
    /// The handler runs as its own task, raced against the initial-response
    /// signal. Whichever finishes first, this method only returns once the
    /// handler has run to completion; if the handler finished first, the
    /// leftover signal-wait task is cancelled and the cancellation awaited
    /// and swallowed.
    pub async fn dispatch(&self, custom_id: &str, ctx: Arc<C>) -> Result<(), InteractionError> {
        let prefix = keys::prefix_of(custom_id);
        let handler = self
            .handlers
            .get(prefix)
            .cloned()
            .ok_or_else(|| InteractionError::UnknownHandler(custom_id.to_string()))?;

        let request_id = Uuid::new_v4();
        debug!("[{request_id}] dispatching '{custom_id}' to '{prefix}'");

        let state = ctx.response_state();
        let mut handler_task = tokio::spawn({
            let ctx = Arc::clone(&ctx);
            async move { handler.handle(ctx).await }
        });
        let mut signal_task = tokio::spawn(async move { state.responded().await });

        let raced = tokio::select! {
            result = &mut handler_task => Some(result),
            _ = &mut signal_task => None,
        };

        // From here the interaction is acknowledged as far as the transport
        // is concerned; what remains is completion and cleanup.
        let handler_result = match raced {
            // Initial response went out first; the handler is still running
            // and must be awaited so its outcome is observed.
            None => {
                debug!("[{request_id}] response sent, awaiting handler completion");
                handler_task.await
            }
            // Handler finished first; cancel the signal-wait and absorb the
            // cancellation so it never surfaces as an error.
            Some(result) => {
                signal_task.abort();
                if let Err(join_error) = signal_task.await {
                    if !join_error.is_cancelled() {
                        return Err(InteractionError::Join {
                            prefix: prefix.to_string(),
                            source: join_error,
                        });
                    }
                }
                result
            }
        };

        match handler_result {
            Ok(Ok(())) => {
                debug!("[{request_id}] '{prefix}' completed");
                Ok(())
            }
            Ok(Err(source)) => Err(InteractionError::Handler {
                prefix: prefix.to_string(),
                source,
            }),
            Err(source) => Err(InteractionError::Join {
                prefix: prefix.to_string(),
                source,
            }),
        }
    }
}

impl<C: RoutedContext> Default for InteractionRouter<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct TestContext {
        state: Arc<ResponseState>,
    }

    impl TestContext {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                state: Arc::new(ResponseState::new()),
            })
        }

        async fn respond(&self) {
            self.state.initial(|| async { Ok(()) }).await.unwrap();
        }
    }

    impl RoutedContext for TestContext {
        fn response_state(&self) -> Arc<ResponseState> {
            Arc::clone(&self.state)
        }
    }

    struct SilentHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InteractionHandler<TestContext> for SilentHandler {
        fn prefix(&self) -> &'static str {
            "silent"
        }

        async fn handle(&self, _ctx: Arc<TestContext>) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct SlowAfterResponseHandler {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl InteractionHandler<TestContext> for SlowAfterResponseHandler {
        fn prefix(&self) -> &'static str {
            "slow"
        }

        async fn handle(&self, ctx: Arc<TestContext>) -> Result<()> {
            ctx.respond().await;
            // Keep working after the response is out
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl InteractionHandler<TestContext> for FailingHandler {
        fn prefix(&self) -> &'static str {
            "failing"
        }

        async fn handle(&self, ctx: Arc<TestContext>) -> Result<()> {
            ctx.respond().await;
            anyhow::bail!("late failure")
        }
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut router = InteractionRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(Arc::new(SilentHandler { calls: calls.clone() }))
            .unwrap();

        let result = router.register(Arc::new(SilentHandler { calls }));
        assert!(matches!(result, Err(InteractionError::DuplicateHandler(p)) if p == "silent"));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut router: InteractionRouter<TestContext> = InteractionRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        router.register(Arc::new(SilentHandler { calls })).unwrap();
        assert_eq!(router.len(), 1);

        router.unregister("silent");
        router.unregister("silent");
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_prefix_is_an_error() {
        let router: InteractionRouter<TestContext> = InteractionRouter::new();
        let result = router.dispatch("nope:1", TestContext::new()).await;
        assert!(matches!(result, Err(InteractionError::UnknownHandler(id)) if id == "nope:1"));
    }

    #[tokio::test]
    async fn test_handler_without_response_still_completes() {
        let mut router = InteractionRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(Arc::new(SilentHandler { calls: calls.clone() }))
            .unwrap();

        // The signal never fires; dispatch must not hang, and the leftover
        // signal-wait must be cancelled without surfacing an error.
        tokio::time::timeout(
            Duration::from_secs(1),
            router.dispatch("silent:1:2", TestContext::new()),
        )
        .await
        .expect("dispatch must not hang")
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_waits_for_handler_after_response() {
        let mut router = InteractionRouter::new();
        let finished = Arc::new(AtomicBool::new(false));
        router
            .register(Arc::new(SlowAfterResponseHandler {
                finished: finished.clone(),
            }))
            .unwrap();

        router.dispatch("slow", TestContext::new()).await.unwrap();

        // dispatch returned only after the post-response work ran
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_handler_error_after_response_is_reported() {
        let mut router = InteractionRouter::new();
        router.register(Arc::new(FailingHandler)).unwrap();

        let result = router.dispatch("failing:9", TestContext::new()).await;
        assert!(matches!(result, Err(InteractionError::Handler { prefix, .. }) if prefix == "failing"));
    }
}
