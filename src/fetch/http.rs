// src/fetch/http.rs

use anyhow::{Context, Result};
use futures::{future::BoxFuture, FutureExt};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::Transport;
use crate::error::SubmitError;

pub const TICKER_PARAM: &str = "ticker";

/// `POST <endpoint>?ticker=<symbol>` with JSON headers and an empty body.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("parsing endpoint URL {}", endpoint))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, endpoint })
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn request_url(&self, symbol: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(TICKER_PARAM, symbol);
        url
    }

    async fn post(&self, symbol: &str) -> Result<Value, SubmitError> {
        let url = self.request_url(symbol);
        debug!(%url, "POST");

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SubmitError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(SubmitError::ResponseNotJson)
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Value, SubmitError>> {
        self.post(symbol).boxed()
    }
}
