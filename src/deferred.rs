//! One-shot asynchronous results.
//!
//! A [`Deferred`] resolves exactly once, either with a value or with a
//! [`RenderError`]. It can be awaited from any executor or waited on with a
//! plain blocking call. The matching [`Resolver`] is consumed by resolution,
//! and dropping it unresolved fails the deferred with
//! [`RenderError::Abandoned`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use crate::{error::RenderError, io::AudioBuffer};

/// Result of an offline render
pub type RenderResult = Deferred<AudioBuffer>;

struct Slot<T> {
    result: Option<Result<T, RenderError>>,
    waker: Option<Waker>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, result: Result<T, RenderError>) {
        let waker = {
            let mut slot = self.lock();
            slot.result = Some(result);
            slot.waker.take()
        };
        self.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Pending single-resolution result
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

/// Completes the paired [`Deferred`]
pub struct Resolver<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Deferred<T> {
    /// Create an unresolved deferred and the resolver that completes it
    pub fn channel() -> (Resolver<T>, Deferred<T>) {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                result: None,
                waker: None,
            }),
            ready: Condvar::new(),
        });
        let resolver = Resolver {
            shared: Some(Arc::clone(&shared)),
        };
        (resolver, Deferred { shared })
    }

    /// An already-resolved deferred
    pub fn resolved(value: T) -> Self {
        let (resolver, deferred) = Self::channel();
        resolver.resolve(value);
        deferred
    }

    /// An already-failed deferred
    pub fn rejected(error: RenderError) -> Self {
        let (resolver, deferred) = Self::channel();
        resolver.reject(error);
        deferred
    }

    /// True once a value or error is available
    pub fn is_ready(&self) -> bool {
        self.shared.lock().result.is_some()
    }

    /// Block the calling thread until the result is available.
    pub fn wait(self) -> Result<T, RenderError> {
        let mut slot = self.shared.lock();
        loop {
            if let Some(result) = slot.result.take() {
                return result;
            }
            slot = self
                .shared
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, RenderError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.lock();
        match slot.result.take() {
            Some(result) => Poll::Ready(result),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Resolver<T> {
    pub fn resolve(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            shared.complete(Ok(value));
        }
    }

    pub fn reject(mut self, error: RenderError) {
        if let Some(shared) = self.shared.take() {
            shared.complete(Err(error));
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.complete(Err(RenderError::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    #[test]
    fn resolved_is_ready_immediately() {
        let deferred = Deferred::resolved(7);
        assert!(deferred.is_ready());
        assert_eq!(block_on(deferred), Ok(7));
    }

    #[test]
    fn rejected_carries_the_error() {
        let deferred: Deferred<()> = Deferred::rejected(RenderError::Closed);
        assert_eq!(deferred.wait(), Err(RenderError::Closed));
    }

    #[test]
    fn resolves_from_another_thread() {
        let (resolver, deferred) = Deferred::channel();
        assert!(!deferred.is_ready());

        let worker = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(5));
            resolver.resolve("done");
        });

        assert_eq!(block_on(deferred), Ok("done"));
        worker.join().unwrap();
    }

    #[test]
    fn dropped_resolver_abandons() {
        let (resolver, deferred) = Deferred::<u32>::channel();
        drop(resolver);
        assert_eq!(deferred.wait(), Err(RenderError::Abandoned));
    }
}
