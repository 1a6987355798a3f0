use reqwest::StatusCode;
use thiserror::Error;

/// Text shown for every failure after a question has been sent.
pub const FETCH_ERROR_TEXT: &str = "Error fetching response. Please try again.";

/// Failures of a single ask round trip.
///
/// The variants only exist for logging. Whatever the kind, the user sees
/// [`FETCH_ERROR_TEXT`].
#[derive(Error, Debug)]
pub enum AskError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl AskError {
    pub fn kind(&self) -> &'static str {
        match self {
            AskError::Network(_) => "network",
            AskError::Status { .. } => "status",
            AskError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for AskError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AskError::Decode(e.to_string())
        } else {
            AskError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AskError {
    fn from(e: serde_json::Error) -> Self {
        AskError::Decode(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration directory available on this system")]
    NoConfigDir,

    #[error("config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
