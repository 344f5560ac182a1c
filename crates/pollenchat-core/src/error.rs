use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Bad input: empty content, out-of-range options, unknown model.
    #[error("{0}")]
    Validation(String),

    /// A single failed attempt against the completion endpoint.
    #[error("{message}")]
    Transient {
        message: String,
        status: Option<u16>,
    },

    /// Every attempt failed. Displays as the last underlying failure.
    #[error("{message}")]
    RetryExhausted {
        attempts: u32,
        message: String,
        status: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transient(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transient {
            message: message.into(),
            status,
        }
    }

    /// Whether the completion client may try the request again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Http(_))
    }

    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transient { status, .. } | Self::RetryExhausted { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
