//! One-shot deferred result with an ordered chain of callback/errback pairs.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        DEFERRED LIFECYCLE                            │
//! │                                                                      │
//! │   add_callbacks*                resolve | reject                     │
//! │  ┌────────────┐               ┌───────────────┐                      │
//! │  ▼            │               ▼               │                      │
//! │ PENDING ──────┴────────► RESOLVING ──(drain)──┴──► RESOLVED          │
//! │                               ▲                        │             │
//! │                               │  chained inner         │ late        │
//! │                               └── deferred pauses      │ add drains  │
//! │                                   the walk             ▼ immediately │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Drain Rules
//!
//! For each entry, in registration order:
//!
//! - value + callback: invoke it; its return becomes the new payload, a
//!   signalled [`Failure`] switches the payload into failure mode
//! - value + no callback: payload passes through unchanged
//! - failure + errback: invoke it; a returned value recovers (the failure
//!   was trapped), a signalled failure keeps or replaces the failure
//! - failure + no errback: the failure propagates past the entry untouched
//!
//! Entries appended while the chain is draining join the tail of the walk.
//! A handler that returns [`Handled::Chained`] pauses the walk until the
//! inner deferred settles; no other entry of the outer chain runs in
//! between, and the inner deferred's terminal payload is consumed by the
//! outer chain.
//!
//! A terminal payload that is still a failure after the last entry is an
//! unhandled failure: it is logged at WARN and left inspectable, but never
//! escalated by the resolving call itself.
//!
//! # Example
//!
//! ```
//! use deferred::{Deferred, ErrorKind, Failure, Handled};
//!
//! let d = Deferred::new();
//! d.add_callback(|thread_id: u64| {
//!     if thread_id == 0 {
//!         Err(Failure::new(ErrorKind::NOT_FOUND, "no such thread"))
//!     } else {
//!         Ok(Handled::Value(thread_id))
//!     }
//! })
//! .add_errback(|f| {
//!     let trapped = f.trap(&[ErrorKind::NOT_FOUND])?;
//!     let _ = trapped;
//!     Ok(Handled::Value(0))
//! });
//! d.resolve(0).unwrap();
//! assert!(!d.has_failed());
//! ```

use crate::failure::Failure;
use crate::outcome::Outcome;
use core::fmt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Error returned when resolving an already-settled deferred.
///
/// This is a programming error at the producing call site; it is surfaced
/// immediately and never travels through the handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The deferred has already been resolved or rejected.
    #[error("deferred has already been resolved")]
    AlreadyResolved,
}

/// What a handler produced for the next chain entry.
#[derive(Debug)]
pub enum Handled<T> {
    /// A plain value; the drain continues immediately.
    Value(T),
    /// Another deferred; the drain pauses until it settles and resumes
    /// with its terminal payload.
    Chained(Deferred<T>),
}

/// Handler invoked when the current payload is a value.
pub type Callback<T> = Box<dyn FnOnce(T) -> Result<Handled<T>, Failure> + Send>;

/// Handler invoked when the current payload is a failure.
pub type Errback<T> = Box<dyn FnOnce(Failure) -> Result<Handled<T>, Failure> + Send>;

enum Entry<T> {
    Handlers {
        on_success: Option<Callback<T>>,
        on_failure: Option<Errback<T>>,
    },
    /// Continuation installed on an inner deferred that an outer chain
    /// paused on: forwards the terminal payload into the outer deferred.
    Resume(Deferred<T>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Resolving,
    Resolved,
}

struct Core<T> {
    state: State,
    /// Terminal payload; `None` while unresolved, and also `None` after
    /// resolution if the payload was consumed by chaining into an outer
    /// deferred.
    payload: Option<Outcome<T>>,
    chain: VecDeque<Entry<T>>,
}

/// One-shot asynchronous result holder with a chain of paired
/// success/failure handlers.
///
/// Cloning yields another handle to the same deferred; the chain and the
/// payload are owned exclusively by the shared core. Handlers always run
/// with the internal lock released, so a handler may append further
/// entries to the deferred it is running on.
pub struct Deferred<T> {
    core: Arc<Mutex<Core<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("Deferred")
            .field("state", &core.state)
            .field("chain_len", &core.chain.len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Deferred<T> {
    /// Creates a pending deferred with an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Arc::new(Mutex::new(Core {
                state: State::Pending,
                payload: None,
                chain: VecDeque::new(),
            })),
        }
    }

    /// Appends one (callback, errback) entry and returns the same deferred
    /// for fluent chaining.
    ///
    /// Either handler may be `None`, meaning the payload passes through
    /// this entry unchanged. If the deferred is already resolved, the new
    /// entry is drained immediately, alone, against the stored terminal
    /// payload, and the stored payload is updated with its result.
    pub fn add_callbacks(
        &self,
        on_success: Option<Callback<T>>,
        on_failure: Option<Errback<T>>,
    ) -> Self {
        self.push_entry(Entry::Handlers {
            on_success,
            on_failure,
        });
        self.clone()
    }

    /// Appends a callback-only entry.
    pub fn add_callback<C>(&self, on_success: C) -> Self
    where
        C: FnOnce(T) -> Result<Handled<T>, Failure> + Send + 'static,
    {
        self.push_entry(Entry::Handlers {
            on_success: Some(Box::new(on_success)),
            on_failure: None,
        });
        self.clone()
    }

    /// Appends an errback-only entry.
    pub fn add_errback<E>(&self, on_failure: E) -> Self
    where
        E: FnOnce(Failure) -> Result<Handled<T>, Failure> + Send + 'static,
    {
        self.push_entry(Entry::Handlers {
            on_success: None,
            on_failure: Some(Box::new(on_failure)),
        });
        self.clone()
    }

    /// Appends one handler that receives whichever side of the payload is
    /// current when the entry runs.
    pub fn add_both<F>(&self, handler: F) -> Self
    where
        F: FnOnce(Outcome<T>) -> Result<Handled<T>, Failure> + Send + Clone + 'static,
    {
        let on_failure = handler.clone();
        self.push_entry(Entry::Handlers {
            on_success: Some(Box::new(move |value| handler(Outcome::Value(value)))),
            on_failure: Some(Box::new(move |failure| on_failure(Outcome::Failed(failure)))),
        });
        self.clone()
    }

    /// Delivers the success value and drains the chain synchronously.
    pub fn resolve(&self, value: T) -> Result<(), ResolveError> {
        self.settle(Outcome::Value(value))
    }

    /// Delivers the failure and drains the chain synchronously.
    pub fn reject(&self, failure: Failure) -> Result<(), ResolveError> {
        self.settle(Outcome::Failed(failure))
    }

    /// Whether the deferred has fully drained.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.core.lock().state == State::Resolved
    }

    /// Whether resolution has not yet begun.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.core.lock().state == State::Pending
    }

    /// Whether the terminal payload is an unconsumed failure.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        matches!(self.core.lock().payload, Some(Outcome::Failed(_)))
    }

    /// Clones the terminal payload, if resolution has completed and the
    /// result was not consumed by chaining.
    ///
    /// Diagnostic and test use only; production consumers read results
    /// through registered handlers, never by polling.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Outcome<T>>
    where
        T: Clone,
    {
        let core = self.core.lock();
        match core.state {
            State::Resolved => core.payload.clone(),
            State::Pending | State::Resolving => None,
        }
    }

    fn settle(&self, payload: Outcome<T>) -> Result<(), ResolveError> {
        {
            let mut core = self.core.lock();
            if core.state != State::Pending {
                return Err(ResolveError::AlreadyResolved);
            }
            core.state = State::Resolving;
        }
        self.drain(payload);
        Ok(())
    }

    /// Appends an entry, or drains it immediately when already resolved.
    fn push_entry(&self, entry: Entry<T>) {
        let reopened = {
            let mut core = self.core.lock();
            match core.state {
                State::Pending | State::Resolving => {
                    core.chain.push_back(entry);
                    return;
                }
                State::Resolved => match core.payload.take() {
                    Some(payload) => {
                        core.state = State::Resolving;
                        core.chain.push_back(entry);
                        payload
                    }
                    None => {
                        tracing::debug!(
                            "handlers registered on a deferred whose result was \
                             consumed by chaining; they will never run"
                        );
                        return;
                    }
                },
            }
        };
        self.drain(reopened);
    }

    /// Walks the chain, feeding the current payload through each entry.
    ///
    /// Handlers run with the lock released, so they may append to this
    /// deferred mid-drain; such entries join the tail of the walk.
    fn drain(&self, mut payload: Outcome<T>) {
        loop {
            let entry = {
                let mut core = self.core.lock();
                match core.chain.pop_front() {
                    Some(entry) => entry,
                    None => {
                        core.state = State::Resolved;
                        if let Outcome::Failed(failure) = &payload {
                            tracing::warn!(
                                kind = %failure.kind(),
                                "deferred drained with unhandled failure: {failure}"
                            );
                        }
                        core.payload = Some(payload);
                        return;
                    }
                }
            };
            match entry {
                Entry::Resume(outer) => {
                    // This deferred was chained into `outer`: hand the
                    // payload over and record our own result as consumed.
                    let dropped = {
                        let mut core = self.core.lock();
                        core.state = State::Resolved;
                        core.payload = None;
                        let dropped = core.chain.len();
                        core.chain.clear();
                        dropped
                    };
                    if dropped > 0 {
                        tracing::debug!(
                            dropped,
                            "discarding handlers registered behind a chain continuation"
                        );
                    }
                    outer.drain(payload);
                    return;
                }
                Entry::Handlers {
                    on_success,
                    on_failure,
                } => {
                    let step = match payload {
                        Outcome::Value(value) => match on_success {
                            Some(callback) => callback(value),
                            None => Ok(Handled::Value(value)),
                        },
                        Outcome::Failed(failure) => match on_failure {
                            Some(errback) => errback(failure),
                            None => Err(failure),
                        },
                    };
                    match step {
                        Ok(Handled::Value(value)) => payload = Outcome::Value(value),
                        Ok(Handled::Chained(inner)) => {
                            // Pause: nothing else in this chain runs until
                            // the inner deferred settles and forwards its
                            // payload back through the continuation.
                            inner.push_entry(Entry::Resume(self.clone()));
                            return;
                        }
                        Err(failure) => payload = Outcome::Failed(failure),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::ErrorKind;

    fn boom() -> Failure {
        Failure::without_origin(ErrorKind::RUNTIME, "boom")
    }

    // =========================================================================
    // State Machine
    // =========================================================================

    #[test]
    fn new_deferred_is_pending() {
        let d: Deferred<i32> = Deferred::new();
        assert!(d.is_pending());
        assert!(!d.is_resolved());
        assert!(d.try_outcome().is_none());
    }

    #[test]
    fn resolve_transitions_to_resolved() {
        let d = Deferred::new();
        d.resolve(1).unwrap();
        assert!(!d.is_pending());
        assert!(d.is_resolved());
        assert_eq!(d.try_outcome(), Some(Outcome::Value(1)));
    }

    #[test]
    fn second_resolution_fails_without_mutating_payload() {
        let d = Deferred::new();
        d.resolve(1).unwrap();
        assert_eq!(d.resolve(2), Err(ResolveError::AlreadyResolved));
        assert_eq!(d.reject(boom()), Err(ResolveError::AlreadyResolved));
        assert_eq!(d.try_outcome(), Some(Outcome::Value(1)));
    }

    #[test]
    fn reject_without_errback_leaves_unhandled_failure() {
        let d: Deferred<i32> = Deferred::new();
        d.reject(boom()).unwrap();
        assert!(d.is_resolved());
        assert!(d.has_failed());
        assert_eq!(d.try_outcome(), Some(Outcome::Failed(boom())));
    }

    // =========================================================================
    // Registration
    // =========================================================================

    #[test]
    fn entry_with_both_handlers_absent_passes_payload_through() {
        let d = Deferred::new();
        d.add_callbacks(None, None);
        d.resolve(5).unwrap();
        assert_eq!(d.try_outcome(), Some(Outcome::Value(5)));
    }

    #[test]
    fn add_both_sees_whichever_side_is_current() {
        let d = Deferred::new();
        d.add_both(|payload: Outcome<i32>| match payload {
            Outcome::Value(v) => Ok(Handled::Value(v + 1)),
            Outcome::Failed(_) => Ok(Handled::Value(-1)),
        });
        d.resolve(1).unwrap();
        assert_eq!(d.try_outcome(), Some(Outcome::Value(2)));

        let d = Deferred::new();
        d.add_both(|payload: Outcome<i32>| match payload {
            Outcome::Value(v) => Ok(Handled::Value(v + 1)),
            Outcome::Failed(_) => Ok(Handled::Value(-1)),
        });
        d.reject(boom()).unwrap();
        assert_eq!(d.try_outcome(), Some(Outcome::Value(-1)));
    }

    #[test]
    fn handlers_registered_on_consumed_deferred_never_run() {
        let inner = Deferred::new();
        let chained = inner.clone();
        let outer = Deferred::new();
        outer.add_callback(move |_: i32| Ok(Handled::Chained(chained)));
        outer.resolve(0).unwrap();
        inner.resolve(9).unwrap();

        // The inner result was handed to the outer chain.
        assert!(inner.is_resolved());
        assert!(inner.try_outcome().is_none());
        assert_eq!(outer.try_outcome(), Some(Outcome::Value(9)));

        // Late handlers on the consumed deferred are dropped, not invoked.
        inner.add_callback(|_| panic!("must not run"));
        assert!(inner.try_outcome().is_none());
    }

    #[test]
    fn debug_format_reports_state() {
        let d: Deferred<i32> = Deferred::new();
        let rendered = format!("{d:?}");
        assert!(rendered.contains("Pending"));
    }
}
