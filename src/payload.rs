// src/payload.rs

use serde_json::Value;
use thiserror::Error;

/// Field that carries the real payload when the endpoint wraps it.
pub const BODY_FIELD: &str = "body";

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("`body` is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Transport wrapper around the data object, resolved once per response.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{ "body": "<json text>" }`: the data object is double-encoded.
    RawString(String),
    /// The data object itself, either under `body` or as the whole response.
    Structured(Value),
}

impl Envelope {
    /// Classify a response. A `body` that is a string or an object wins, and
    /// an explicit `null` body means there is no data. Anything else (absent,
    /// number, ...) means the whole response is the data object.
    pub fn classify(response: Value) -> Self {
        match response {
            Value::Object(mut map) => match map.remove(BODY_FIELD) {
                Some(Value::String(text)) => Envelope::RawString(text),
                Some(body @ (Value::Object(_) | Value::Null)) => Envelope::Structured(body),
                Some(other) => {
                    map.insert(BODY_FIELD.to_string(), other);
                    Envelope::Structured(Value::Object(map))
                }
                None => Envelope::Structured(Value::Object(map)),
            },
            other => Envelope::Structured(other),
        }
    }

    pub fn into_data(self) -> Result<Value, PayloadError> {
        match self {
            Envelope::RawString(text) => Ok(serde_json::from_str(&text)?),
            Envelope::Structured(value) => Ok(value),
        }
    }
}

/// Extract the data object from a raw response body.
pub fn unwrap_payload(response: Value) -> Result<Value, PayloadError> {
    Envelope::classify(response).into_data()
}
