/// Core error types for jackbot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing config value: {0}")]
    Missing(&'static str),
}

/// Failures talking to an external collaborator (catalog search,
/// persistence, session cache, send API, profile API).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while routing one inbound event.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Malformed postback payload: {0}")]
    MalformedPayload(String),

    #[error("Postback payload exceeds the platform byte limit ({0} bytes)")]
    PayloadTooLarge(usize),

    #[error("No session for sender {0}")]
    NoSession(String),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub type Result<T> = std::result::Result<T, BotError>;
