use thiserror::Error;

/// Failures surfaced by a model call. Callers treat every variant the same way: the attempt
/// failed and the next rung of their ladder applies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{backend} request failed: {message}")]
    Transport {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} returned {status}: {body}")]
    Backend {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{message}")]
    RateLimited {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} response invalid: {message}")]
    InvalidResponse {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} response missing content")]
    EmptyResponse { backend: &'static str },

    #[error("model call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("missing API key; supply llm.api_key or set {}", .env_keys.join(" or "))]
    MissingApiKey { env_keys: &'static [&'static str] },

    #[error("backend configuration error: {0}")]
    Configuration(String),

    #[error("scripted backend: {0}")]
    Scripted(String),
}

impl GatewayError {
    pub fn transport(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            backend,
            message: err.to_string(),
        }
    }

    pub fn invalid_response(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            backend,
            message: err.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }

    /// Errors raised before any request is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingApiKey { .. } | GatewayError::Configuration(_)
        )
    }
}
