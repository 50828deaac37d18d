//! Typed failure payload and selective error trapping.
//!
//! A [`Failure`] is the error half of a drained payload: an enumerable
//! [`ErrorKind`] tag, a human-readable message, and the source location
//! where the failure was constructed (the diagnostic analogue of a
//! captured stack trace).
//!
//! Trapping is a set-membership test on the kind tag, never a type check.
//! An errback that only handles certain kinds calls [`Failure::trap`] and
//! re-signals everything else unchanged with `?`:
//!
//! ```
//! use deferred::{ErrorKind, Failure};
//!
//! fn only_runtime(failure: Failure) -> Result<i32, Failure> {
//!     let _trapped = failure.trap(&[ErrorKind::RUNTIME])?;
//!     Ok(0)
//! }
//!
//! assert!(only_runtime(Failure::new(ErrorKind::RUNTIME, "boom")).is_ok());
//! assert!(only_runtime(Failure::new(ErrorKind::TIMEOUT, "slow")).is_err());
//! ```

use core::fmt;
use std::panic::Location;

/// An enumerable error kind tag.
///
/// Kinds compare by tag name equality. Well-known kinds are provided as
/// constants; callers define their own with [`ErrorKind::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorKind(&'static str);

impl ErrorKind {
    /// A logic error raised while handling a result.
    pub const RUNTIME: Self = Self("runtime");
    /// A value was malformed or out of range.
    pub const VALUE: Self = Self("value");
    /// A requested entity does not exist.
    pub const NOT_FOUND: Self = Self("not-found");
    /// An operation exceeded its time allowance.
    pub const TIMEOUT: Self = Self("timeout");

    /// Creates a kind with the given tag name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the tag name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The error half of a drained payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: ErrorKind,
    message: String,
    origin: Option<String>,
}

impl Failure {
    /// Creates a failure, capturing the caller's source location as the
    /// originating context.
    #[must_use]
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            kind,
            message: message.into(),
            origin: Some(format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )),
        }
    }

    /// Creates a failure with no captured origin.
    #[must_use]
    pub fn without_origin(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            origin: None,
        }
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the captured originating-context description, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Claims this failure if its kind is a member of `kinds`.
    ///
    /// Returns `Ok(self)` when the kind matches: the failure is trapped and
    /// the errback continues normally. Returns `Err(self)` otherwise, so
    /// that `?` re-signals the identical failure past the current errback
    /// exactly as if no errback had been registered.
    pub fn trap(self, kinds: &[ErrorKind]) -> Result<Self, Self> {
        if kinds.contains(&self.kind) {
            Ok(self)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(origin) = &self.origin {
            write!(f, " (raised at {origin})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_claims_matching_kind() {
        let failure = Failure::new(ErrorKind::RUNTIME, "boom");
        let trapped = failure.trap(&[ErrorKind::RUNTIME, ErrorKind::VALUE]);
        assert_eq!(trapped.unwrap().kind(), ErrorKind::RUNTIME);
    }

    #[test]
    fn trap_re_signals_non_member_unchanged() {
        let failure = Failure::new(ErrorKind::TIMEOUT, "slow");
        let expected = failure.clone();
        let err = failure.trap(&[ErrorKind::RUNTIME]).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn trap_with_empty_set_re_signals() {
        let failure = Failure::new(ErrorKind::RUNTIME, "boom");
        assert!(failure.trap(&[]).is_err());
    }

    #[test]
    fn new_captures_origin() {
        let failure = Failure::new(ErrorKind::VALUE, "bad input");
        let origin = failure.origin().unwrap();
        assert!(origin.contains("failure.rs"));
    }

    #[test]
    fn without_origin_has_none() {
        let failure = Failure::without_origin(ErrorKind::VALUE, "bad input");
        assert!(failure.origin().is_none());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let failure = Failure::without_origin(ErrorKind::NOT_FOUND, "no such thread");
        assert_eq!(failure.to_string(), "[not-found] no such thread");
    }

    #[test]
    fn custom_kinds_compare_by_name() {
        assert_eq!(ErrorKind::new("runtime"), ErrorKind::RUNTIME);
        assert_ne!(ErrorKind::new("custom"), ErrorKind::RUNTIME);
    }
}
