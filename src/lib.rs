//! Deferred: one-shot chained-callback results with selective error trapping.
//!
//! # Overview
//!
//! A [`Deferred`] is a single-consumer asynchronous result box. A producer
//! creates it, consumers register ordered pairs of success/failure handlers,
//! and the producer resolves it exactly once with either a value or a
//! [`Failure`]. Resolution walks the handler chain in registration order,
//! switching the payload between value and failure according to each
//! handler's outcome.
//!
//! # Core Guarantees
//!
//! - **Single resolution**: a second `resolve`/`reject` fails with
//!   [`ResolveError::AlreadyResolved`] and never touches the stored result
//! - **Strict ordering**: entries run in registration order, including
//!   entries appended while the chain is draining
//! - **Registration-time independence**: handlers observe the same payload
//!   sequence whether they were registered before or after resolution
//! - **Selective trapping**: an errback claims only the error kinds it
//!   traps; every other failure propagates past it unchanged
//! - **Synchronous drain**: handlers run on the resolving caller's thread;
//!   the only suspension point is a handler returning a pending chained
//!   deferred
//!
//! # Module Structure
//!
//! - [`failure`]: [`ErrorKind`] tags, [`Failure`] payloads, trapping
//! - [`outcome`]: the [`Outcome`] value/failure union and direct-style
//!   single-entry application
//! - [`deferred`]: the [`Deferred`] chain itself
//!
//! # Example
//!
//! ```
//! use deferred::{Deferred, ErrorKind, Failure, Handled};
//!
//! let d = Deferred::new();
//! d.add_callback(|n: i32| Ok(Handled::Value(n + 1)))
//!     .add_callback(|_| Err(Failure::new(ErrorKind::RUNTIME, "boom")))
//!     .add_errback(|f| {
//!         let trapped = f.trap(&[ErrorKind::RUNTIME])?;
//!         Ok(Handled::Value(trapped.message().len() as i32))
//!     });
//! d.resolve(5).unwrap();
//! assert_eq!(d.try_outcome().unwrap().into_result().unwrap(), 4);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_inception)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod deferred;
pub mod failure;
pub mod outcome;

pub use deferred::{Callback, Deferred, Errback, Handled, ResolveError};
pub use failure::{ErrorKind, Failure};
pub use outcome::Outcome;
