use thiserror::Error;

/// Error enum shared by both backup tools
#[derive(Error, Debug)]
pub enum BackupToolError {
    // Startup errors
    #[error("Missing required env: {}", .0.join(", "))]
    MissingConfiguration(Vec<&'static str>),

    #[error("Malformed connection URL: {0}")]
    MalformedDescriptor(String),

    // Object store errors
    #[error("Authentication failed: Invalid credentials or access denied ({0})")]
    AuthenticationFailed(String),

    #[error("Object store request failed during {context}: {message}")]
    Storage { context: String, message: String },

    #[error("Empty response body for object: {0}")]
    EmptyBody(String),

    #[error("Transfer of {key} interrupted: {source}")]
    TransferInterrupted {
        key: String,
        #[source]
        source: std::io::Error,
    },

    // Selection and execution errors
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Command not found or execution error: {0}")]
    CommandNotFound(String),

    // Automatic conversions
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    DialogueError(#[from] dialoguer::Error),

    #[error(transparent)]
    TemplateError(#[from] indicatif::style::TemplateError),
}

pub type Result<T> = std::result::Result<T, BackupToolError>;

impl BackupToolError {
    /// Classify an object store error message into a specific error type
    pub fn from_sdk_message(message: &str, context: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("access denied")
            || lower.contains("accessdenied")
            || lower.contains("invalidaccesskeyid")
            || lower.contains("signaturedoesnotmatch")
            || lower.contains("forbidden")
        {
            BackupToolError::AuthenticationFailed(context.to_string())
        } else {
            BackupToolError::Storage {
                context: context.to_string(),
                message: message.to_string(),
            }
        }
    }
}
