//! Conformance checks for implementations of the uhsapi interfaces.
//!
//! Every check is written against the traits only. An implementation runs them from its own
//! tests, handing in freshly constructed values as each function documents. The checks panic
//! on the first violation.

pub mod message;
pub mod request;
pub mod response;
pub mod server;
pub mod stream;
pub mod upload;
pub mod uri;

/// Unwraps a result, naming the operation that failed
pub(crate) fn ok<T, E: std::fmt::Debug>(res: Result<T, E>, what: &str) -> T {
    match res {
        Ok(value) => value,
        Err(err) => panic!("{what} failed: {err:?}"),
    }
}
