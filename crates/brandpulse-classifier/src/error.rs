use thiserror::Error;

/// Errors returned by the chat-completion API client.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API accepted the request but returned an unusable response.
    #[error("classifier API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
