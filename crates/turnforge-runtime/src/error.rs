use std::fmt;

/// Result type for turnforge-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Storage layer error
    Store(turnforge_store::Error),

    /// Oracle boundary error that could not be absorbed by a stub stage
    Oracle(turnforge_oracle::Error),

    /// A pipeline stage exceeded its deadline with no stub fallback
    StageTimeout(String),

    /// Campaign or application configuration is invalid
    Config(String),

    /// JSON (de)serialization failed
    Serde(serde_json::Error),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Oracle(err) => write!(f, "Oracle error: {}", err),
            Error::StageTimeout(stage) => write!(f, "Stage timed out: {}", stage),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Serde(err) => write!(f, "JSON error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Oracle(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::StageTimeout(_) | Error::Config(_) => None,
        }
    }
}

impl From<turnforge_store::Error> for Error {
    fn from(err: turnforge_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<turnforge_oracle::Error> for Error {
    fn from(err: turnforge_oracle::Error) -> Self {
        Error::Oracle(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
