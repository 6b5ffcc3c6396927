// src/fetch/mod.rs

pub mod http;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::SubmitError;

pub use http::HttpTransport;

/// Issues the lookup request for one symbol and yields the raw JSON body.
///
/// Failures map onto `Network`, `HttpStatus` or `ResponseNotJson`; the
/// envelope is not inspected here.
pub trait Transport: Send + Sync {
    fn fetch<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Value, SubmitError>>;
}
