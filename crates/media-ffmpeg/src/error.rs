use thiserror::Error;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, MediaFfmpegError>;

/// Errors from probing and rendering through the FFmpeg CLI tools.
#[derive(Debug, Error)]
pub enum MediaFfmpegError {
    #[error("invalid render request: {reason}")]
    InvalidRenderRequest { reason: &'static str },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("command failed ({status}): {command}; stderr: {}", .stderr.trim())]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("utf8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("parse error ({context}): {value}")]
    Parse { context: &'static str, value: String },
}
