// src/error.rs

use std::time::Duration;
use thiserror::Error;

use crate::payload::PayloadError;
use crate::views::ProjectionError;

/// Everything that can end a submission before its tables are committed.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("ticker symbol is empty")]
    EmptySymbol,

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("response body is not JSON: {0}")]
    ResponseNotJson(#[source] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] PayloadError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("writing render surface: {0}")]
    Surface(#[from] std::io::Error),
}

/// Coarse failure category, used as a structured field in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Network,
    HttpStatus,
    Parse,
    Projection,
    Surface,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Network => "network",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Parse => "parse",
            ErrorKind::Projection => "projection",
            ErrorKind::Surface => "surface",
        }
    }
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::EmptySymbol => ErrorKind::Input,
            SubmitError::Network(_) | SubmitError::Timeout(_) => ErrorKind::Network,
            SubmitError::HttpStatus { .. } => ErrorKind::HttpStatus,
            SubmitError::ResponseNotJson(_) | SubmitError::Parse(_) => ErrorKind::Parse,
            SubmitError::Projection(_) => ErrorKind::Projection,
            SubmitError::Surface(_) => ErrorKind::Surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure_taxonomy() {
        assert_eq!(SubmitError::EmptySymbol.kind(), ErrorKind::Input);
        assert_eq!(
            SubmitError::Timeout(Duration::from_secs(3)).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            SubmitError::HttpStatus { status: 502 }.kind(),
            ErrorKind::HttpStatus
        );

        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(SubmitError::ResponseNotJson(bad).kind(), ErrorKind::Parse);

        let err = SubmitError::from(ProjectionError::new("offerings", "expected an object"));
        assert_eq!(err.kind(), ErrorKind::Projection);
        assert_eq!(err.kind().as_str(), "projection");
    }

    #[test]
    fn http_status_message_names_the_code() {
        let err = SubmitError::HttpStatus { status: 404 };
        assert_eq!(err.to_string(), "HTTP 404");
    }
}
