//! Demonstration: the same handler pair run directly over an [`Outcome`]
//! and through a rejected [`Deferred`] produce identical output.
//!
//! An already-failed input is fed through a chain of two callbacks and one
//! errback. Both callbacks are skipped because the payload is a failure
//! from the start; the errback traps the runtime failure and recovers. The
//! invocation counter the handlers share is explicit caller-supplied state
//! captured by the closures, not a process-wide global.

use deferred::{Deferred, ErrorKind, Failure, Handled, Outcome, ResolveError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counter {
    num: u32,
}

type SharedCounter = Arc<Mutex<Counter>>;

fn handle_result(counter: &SharedCounter, result: String) -> Result<String, Failure> {
    let mut counter = counter.lock();
    counter.num += 1;
    println!("callback {}", counter.num);
    println!("\tgot result: {result}");
    Ok("handled the result".to_string())
}

fn fail_at_handling_result(counter: &SharedCounter, result: String) -> Result<String, Failure> {
    let mut counter = counter.lock();
    counter.num += 1;
    println!("callback {}", counter.num);
    println!("\tgot result: {result}");
    println!("\tabout to signal a failure");
    Err(Failure::new(
        ErrorKind::RUNTIME,
        "whoops! we encountered an error",
    ))
}

fn handle_failure(failure: Failure) -> Result<String, Failure> {
    println!("errback");
    println!("\twe got a failure: {failure}");
    let _trapped = failure.trap(&[ErrorKind::RUNTIME])?;
    Ok("recovered from the failure".to_string())
}

/// Direct style: fold the handlers over the payload one entry at a time.
fn direct_example(counter: &SharedCounter, initial: Outcome<String>) -> Outcome<String> {
    let first = Arc::clone(counter);
    let second = Arc::clone(counter);
    initial
        .apply_callback(move |r| handle_result(&first, r))
        .apply_callback(move |r| fail_at_handling_result(&second, r))
        .apply_errback(handle_failure)
}

/// Deferred style: register the same handlers, then reject.
fn deferred_example(
    counter: &SharedCounter,
    failure: Failure,
) -> Result<Option<Outcome<String>>, ResolveError> {
    let first = Arc::clone(counter);
    let second = Arc::clone(counter);
    let d = Deferred::new();
    d.add_callback(move |r| handle_result(&first, r).map(Handled::Value))
        .add_callback(move |r| fail_at_handling_result(&second, r).map(Handled::Value))
        .add_errback(|f| handle_failure(f).map(Handled::Value));
    d.reject(failure)?;
    Ok(d.try_outcome())
}

fn main() -> Result<(), ResolveError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let counter: SharedCounter = Arc::default();

    let initial: Outcome<String> = Failure::new(ErrorKind::RUNTIME, "*doh*! failure!").into();
    let terminal = direct_example(&counter, initial);
    println!("terminal payload: {terminal:?}");

    println!("\n-------------------------------------------------\n");

    counter.lock().num = 0;
    let terminal = deferred_example(&counter, Failure::new(ErrorKind::RUNTIME, "*doh*! failure!"))?;
    println!("terminal payload: {terminal:?}");
    Ok(())
}
