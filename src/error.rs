use thiserror::Error;

/// Unified error type for merge-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Git query '{query}' failed (args: {args}): {message}")]
    Oracle {
        query: String,
        args: String,
        message: String,
    },

    #[error("Cannot run '{program}': {source}")]
    OracleUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Release error: {0}")]
    Release(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in merge-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a release-creation error with context
    pub fn release(msg: impl Into<String>) -> Self {
        ReleaseError::Release(msg.into())
    }

    /// Create an error for a failed version-control query.
    ///
    /// `args` is joined with spaces so the message shows the exact invocation.
    pub fn oracle(query: impl Into<String>, args: &[&str], message: impl Into<String>) -> Self {
        ReleaseError::Oracle {
            query: query.into(),
            args: args.join(" "),
            message: message.into(),
        }
    }
}
