//! Tagged success/failure union threaded through a callback chain.
//!
//! The outcome type represents the current payload of a drain:
//!
//! - `Value(T)`: success with a value
//! - `Failed(Failure)`: a typed failure
//!
//! [`Outcome::apply`] (and the [`apply_callback`](Outcome::apply_callback) /
//! [`apply_errback`](Outcome::apply_errback) shorthands) perform exactly one
//! chain entry's worth of work without any deferred: the handler's return
//! value and any failure it signals are normalised back into the union. The
//! same business logic expressed in this direct, synchronous style must
//! observe the same payload transitions as a deferred chain fed the same
//! handlers; that equivalence is the core contract of the crate.

use crate::failure::Failure;

/// The payload of a drained chain: a value or a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Success with a value.
    Value(T),
    /// A typed failure.
    Failed(Failure),
}

impl<T> Outcome<T> {
    /// Returns true if this outcome is a value.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns true if this outcome is a failure.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns a reference to the value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// Returns a reference to the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Value(_) => None,
            Self::Failed(f) => Some(f),
        }
    }

    /// Maps the success value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Value(v) => Outcome::Value(f(v)),
            Self::Failed(e) => Outcome::Failed(e),
        }
    }

    /// Converts this outcome into a standard `Result`.
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Failed(e) => Err(e),
        }
    }

    /// Applies one (callback, errback) entry in the direct style.
    ///
    /// An absent handler means the payload passes through this entry
    /// unchanged; a present handler's `Result` is normalised back into the
    /// union, so a handler that signals a failure switches the payload into
    /// failure mode for the next entry and an errback that returns a value
    /// switches it back.
    #[must_use]
    pub fn apply<C, E>(self, on_success: Option<C>, on_failure: Option<E>) -> Self
    where
        C: FnOnce(T) -> Result<T, Failure>,
        E: FnOnce(Failure) -> Result<T, Failure>,
    {
        match self {
            Self::Value(v) => match on_success {
                Some(callback) => callback(v).into(),
                None => Self::Value(v),
            },
            Self::Failed(e) => match on_failure {
                Some(errback) => errback(e).into(),
                None => Self::Failed(e),
            },
        }
    }

    /// Applies a callback-only entry: failures pass through untouched.
    #[must_use]
    pub fn apply_callback<C>(self, on_success: C) -> Self
    where
        C: FnOnce(T) -> Result<T, Failure>,
    {
        match self {
            Self::Value(v) => on_success(v).into(),
            failed @ Self::Failed(_) => failed,
        }
    }

    /// Applies an errback-only entry: values pass through untouched.
    #[must_use]
    pub fn apply_errback<E>(self, on_failure: E) -> Self
    where
        E: FnOnce(Failure) -> Result<T, Failure>,
    {
        match self {
            value @ Self::Value(_) => value,
            Self::Failed(e) => on_failure(e).into(),
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(e) => Self::Failed(e),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
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
    // Predicates and Accessors
    // =========================================================================

    #[test]
    fn predicates() {
        let value: Outcome<i32> = Outcome::Value(1);
        let failed: Outcome<i32> = Outcome::Failed(boom());
        assert!(value.is_value());
        assert!(!value.is_failed());
        assert!(failed.is_failed());
        assert!(!failed.is_value());
    }

    #[test]
    fn accessors() {
        let value: Outcome<i32> = Outcome::Value(7);
        assert_eq!(value.value(), Some(&7));
        assert!(value.failure().is_none());

        let failed: Outcome<i32> = Outcome::Failed(boom());
        assert!(failed.value().is_none());
        assert_eq!(failed.failure().unwrap().kind(), ErrorKind::RUNTIME);
    }

    #[test]
    fn map_and_into_result() {
        let doubled = Outcome::Value(4).map(|n: i32| n * 2);
        assert_eq!(doubled.into_result().unwrap(), 8);

        let failed: Outcome<i32> = Outcome::Failed(boom());
        assert!(failed.map(|n| n * 2).into_result().is_err());
    }

    // =========================================================================
    // Direct-Style Application
    // =========================================================================

    #[test]
    fn apply_runs_callback_on_value() {
        let next = Outcome::Value(5).apply_callback(|n| Ok(n + 1));
        assert_eq!(next, Outcome::Value(6));
    }

    #[test]
    fn apply_normalises_signalled_failure() {
        let next = Outcome::Value(5).apply_callback(|_: i32| Err(boom()));
        assert_eq!(next, Outcome::Failed(boom()));
    }

    #[test]
    fn apply_callback_skips_failure() {
        let next = Outcome::<i32>::Failed(boom()).apply_callback(|n| Ok(n + 1));
        assert_eq!(next, Outcome::Failed(boom()));
    }

    #[test]
    fn apply_errback_recovers_failure() {
        let next = Outcome::<i32>::Failed(boom()).apply_errback(|_| Ok(0));
        assert_eq!(next, Outcome::Value(0));
    }

    #[test]
    fn apply_errback_skips_value() {
        let next = Outcome::Value(5).apply_errback(|_| Ok(0));
        assert_eq!(next, Outcome::Value(5));
    }

    #[test]
    fn apply_with_both_absent_is_identity() {
        let next = Outcome::Value(5).apply(
            None::<fn(i32) -> Result<i32, Failure>>,
            None::<fn(Failure) -> Result<i32, Failure>>,
        );
        assert_eq!(next, Outcome::Value(5));
    }
}
