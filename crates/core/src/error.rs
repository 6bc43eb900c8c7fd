#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required setting is missing or malformed. Raised before any
    /// notifier session is opened.
    #[error("Configuration error: {0}")]
    Config(String),
}
