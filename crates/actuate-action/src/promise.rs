//! The memoized, shareable outcome of an execution.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;

use crate::error::ActionError;
use crate::reason::Rejection;

/// Final outcome delivered by a [`Promise`].
pub type Settlement = Result<Option<Value>, Rejection>;

/// One-shot outcome of an execution.
///
/// Clones share the same underlying future: awaiting any of them yields the
/// same settlement, and it is delivered exactly once to the shared state.
#[derive(Clone)]
pub struct Promise {
    inner: Shared<BoxFuture<'static, Settlement>>,
}

/// Write side of a pending promise.
pub(crate) struct Resolver {
    sender: oneshot::Sender<Settlement>,
}

impl Resolver {
    /// Settle the paired promise. Consumes the resolver so it fires once.
    pub(crate) fn settle(self, settlement: Settlement) {
        // The receiver lives inside the shared future, which is dropped only
        // when every promise clone is gone; nobody is left to notify then.
        let _ = self.sender.send(settlement);
    }
}

impl Promise {
    /// A pending promise and the resolver that settles it.
    pub(crate) fn pending() -> (Promise, Resolver) {
        let (sender, receiver) = oneshot::channel();
        let inner = receiver
            .map(|received| {
                received.unwrap_or_else(|_| Err(Rejection::Failed(ActionError::Abandoned)))
            })
            .boxed()
            .shared();
        (Promise { inner }, Resolver { sender })
    }

    /// A promise that is already settled.
    pub fn settled(settlement: Settlement) -> Self {
        Promise {
            inner: future::ready(settlement).boxed().shared(),
        }
    }

    pub fn resolved(result: Option<Value>) -> Self {
        Promise::settled(Ok(result))
    }

    /// A promise already rejected with `err`, as a cancellation or a
    /// failure depending on its kind.
    pub fn rejected(err: ActionError) -> Self {
        Promise::settled(Err(err.into()))
    }

    /// The settlement, if it is available without waiting.
    pub fn try_settlement(&self) -> Option<Settlement> {
        self.inner.clone().now_or_never()
    }

    /// True when both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Shared::ptr_eq(&self.inner, &other.inner)
    }
}

impl Future for Promise {
    type Output = Settlement;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for Promise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.try_settlement() {
            Some(settlement) => f.debug_tuple("Promise").field(&settlement).finish(),
            None => f.write_str("Promise(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settled_promise_is_available_immediately() {
        let promise = Promise::resolved(Some(json!(1)));
        assert_eq!(promise.try_settlement(), Some(Ok(Some(json!(1)))));
    }

    #[test]
    fn test_rejected_promise_carries_failure() {
        let promise = Promise::rejected(ActionError::MissingTarget);
        assert_eq!(
            promise.try_settlement(),
            Some(Err(Rejection::Failed(ActionError::MissingTarget)))
        );
    }

    #[test]
    fn test_rejected_with_user_error_is_a_cancellation() {
        let promise = Promise::rejected(ActionError::canceled("not today"));
        let rejection = promise.try_settlement().unwrap().unwrap_err();
        assert!(rejection.is_canceled());
        assert_eq!(rejection.error(), Some(&ActionError::canceled("not today")));
    }

    #[test]
    fn test_pending_until_resolved() {
        let (promise, resolver) = Promise::pending();
        assert_eq!(promise.try_settlement(), None);
        resolver.settle(Ok(None));
        assert_eq!(promise.try_settlement(), Some(Ok(None)));
    }

    #[tokio::test]
    async fn test_clones_share_one_settlement() {
        let (promise, resolver) = Promise::pending();
        let other = promise.clone();
        assert!(promise.ptr_eq(&other));

        let waiter = tokio::spawn(other);
        resolver.settle(Err(Rejection::Canceled(None)));

        assert_eq!(promise.await, Err(Rejection::Canceled(None)));
        assert_eq!(waiter.await.unwrap(), Err(Rejection::Canceled(None)));
    }

    #[tokio::test]
    async fn test_dropped_resolver_rejects_as_abandoned() {
        let (promise, resolver) = Promise::pending();
        drop(resolver);
        assert_eq!(
            promise.await,
            Err(Rejection::Failed(ActionError::Abandoned))
        );
    }

    #[test]
    fn test_distinct_promises_are_not_ptr_eq() {
        let a = Promise::resolved(None);
        let b = Promise::resolved(None);
        assert!(!a.ptr_eq(&b));
    }
}
