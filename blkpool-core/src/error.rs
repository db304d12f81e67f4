use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unknown volume type {0}")]
    UnknownType(String),

    #[error("Missing image file: {}", .0.display())]
    MissingImage(PathBuf),

    #[error("Volume {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Missing the source {} to copy from", .0.display())]
    SourceMissing(PathBuf),

    #[error("Invalid volume configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Command `{command}` failed: {cause}")]
    CommandFailed { command: String, cause: String },

    #[error("Error while copying {} to {}: {cause}", .from.display(), .to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        cause: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PoolError>;

impl PoolError {
    pub fn command_failed(command: &std::process::Command, cause: impl ToString) -> Self {
        PoolError::CommandFailed {
            command: render_command(command),
            cause: cause.to_string(),
        }
    }
}

/// Renders a command the way a shell user would type it, for error messages.
pub fn render_command(command: &std::process::Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
