use thiserror::Error;

/// Errors raised while reshaping a record returned by the BOM API.
///
/// These point at a mismatch between the payload and what the normalizer
/// expects, so they are surfaced to the caller instead of being retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record has no '{key}' key")]
    MissingKey { key: String },

    #[error("unknown condition descriptor '{descriptor}'")]
    UnknownCondition { descriptor: String },

    #[error("'{key}' is neither an object nor null")]
    NotAGroup { key: String },

    #[error("'{key}' is not a list")]
    NotAList { key: String },
}

impl NormalizeError {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }
}

/// Errors from the fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate ({latitude}, {longitude}) is out of range")]
pub struct CoordinateError {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why one endpoint produced no document during a refresh.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

#[derive(Debug, Error)]
#[error("{endpoint}: {error}")]
pub struct EndpointFailure {
    pub endpoint: crate::collector::Endpoint,
    #[source]
    pub error: EndpointError,
}

/// Returned by a refresh in which at least one endpoint failed. The
/// remaining endpoints were still fetched.
#[derive(Debug, Error)]
#[error("{} endpoint(s) failed: {}", .failures.len(), describe(.failures))]
pub struct RefreshError {
    pub failures: Vec<EndpointFailure>,
}

impl RefreshError {
    /// Failures caused by the payload shape rather than the transport.
    pub fn normalize_errors(&self) -> impl Iterator<Item = &NormalizeError> {
        self.failures.iter().filter_map(|failure| match &failure.error {
            EndpointError::Normalize(err) => Some(err),
            EndpointError::Fetch(_) => None,
        })
    }
}

fn describe(failures: &[EndpointFailure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
