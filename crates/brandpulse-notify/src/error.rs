use thiserror::Error;

/// Errors surfaced by the notification router and channel adapters.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A channel API rejected the request.
    #[error("channel API error: {0}")]
    Api(String),

    /// A persistence call failed.
    #[error(transparent)]
    Db(#[from] brandpulse_db::DbError),
}
