use dailysync_core::ConfigError;
use thiserror::Error;

/// Exit statuses. Request failures reuse curl's codes so scheduler logs read
/// the same as they did for `curl -sS --fail`.
pub const EXIT_TRANSPORT: u8 = 7;
pub const EXIT_HTTP_STATUS: u8 = 22;
pub const EXIT_TIMEOUT: u8 = 28;
pub const EXIT_SOFTWARE: u8 = 70;
pub const EXIT_CONFIG: u8 = 78;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client setup failed: {0}")]
    Client(reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Connection not established within {secs}s")]
    ConnectTimeout { secs: u64 },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl TriggerError {
    /// Short error code string used in log records.
    pub fn code(&self) -> &'static str {
        match self {
            TriggerError::Config(e) => e.code(),
            TriggerError::InvalidUrl { .. } => "INVALID_URL",
            TriggerError::Client(_) => "CLIENT_ERROR",
            TriggerError::Transport(_) => "TRANSPORT_ERROR",
            TriggerError::ConnectTimeout { .. } => "CONNECT_TIMEOUT",
            TriggerError::Timeout { .. } => "TIMEOUT",
            TriggerError::Status { .. } => "HTTP_STATUS_ERROR",
        }
    }

    /// Process exit status for this failure. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            TriggerError::Config(_) | TriggerError::InvalidUrl { .. } => EXIT_CONFIG,
            TriggerError::Client(_) => EXIT_SOFTWARE,
            TriggerError::Transport(_) => EXIT_TRANSPORT,
            TriggerError::ConnectTimeout { .. } | TriggerError::Timeout { .. } => EXIT_TIMEOUT,
            TriggerError::Status { .. } => EXIT_HTTP_STATUS,
        }
    }
}

pub type Result<T> = std::result::Result<T, TriggerError>;
