use thiserror::Error;

/// Error types for model gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway is missing a credential or other required configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Caller supplied a malformed request (e.g. empty message list)
    #[error("Invalid request: {message}")]
    InvalidInput { message: String },

    /// Provider returned a non-2xx status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network or connection error
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Provider returned a 2xx response we could not make sense of
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an API error
    pub fn api_error(status: u16, message: String) -> Self {
        Self::Api { status, message }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
