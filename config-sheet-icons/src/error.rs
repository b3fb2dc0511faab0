/// Errors that can occur while talking to the icon service.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by icon service")]
    RateLimit,

    #[error("No icon found for '{0}'")]
    NotFound(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IconError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn not_found(term: impl Into<String>) -> Self {
        Self::NotFound(term.into())
    }

    /// Whether trying the same request again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimit | Self::NotFound(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            Self::Api(_) | Self::Json(_) => false,
        }
    }
}
