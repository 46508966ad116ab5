use thiserror::Error;

/// Errors surfaced by individual source collectors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API rejected the request with a rate limit. The run
    /// records the source as deferred and the next scheduled pass retries.
    #[error("rate limited by upstream API")]
    RateLimited,

    /// The upstream API returned an error response.
    #[error("source API error: {0}")]
    Api(String),

    /// A response body could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A persistence call failed.
    #[error(transparent)]
    Db(#[from] brandpulse_db::DbError),

    /// A classifier call that has no deterministic fallback failed.
    #[error(transparent)]
    Classifier(#[from] brandpulse_classifier::ClassifierError),
}
