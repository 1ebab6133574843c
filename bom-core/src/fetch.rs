use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::FetchError;

/// Header value BOM expects from API clients.
pub const DEFAULT_USER_AGENT: &str = "MakeThisAPIOpenSource/1.0.0";

/// Raw response handed back by a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, failing on a non-success status.
    pub fn json(&self) -> Result<Value, FetchError> {
        if !self.is_success() {
            return Err(FetchError::Status {
                status: self.status,
                body: truncate_body(&self.body),
            });
        }

        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Performs GET requests on behalf of the collector.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        tracing::debug!(%url, "requesting");

        let res = self.http.get(url).send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(FetchResponse { status, body })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
