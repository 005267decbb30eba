use std::fmt;

/// Result type for turnforge-oracle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur at the oracle boundary
#[derive(Debug)]
pub enum Error {
    /// The provider did not answer within the deadline
    Timeout,

    /// The provider returned output that does not decode as requested
    Malformed(String),

    /// No prompt template with this id (or version) exists
    PromptNotFound(String),

    /// Reading a prompt template from disk failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout => write!(f, "Oracle call timed out"),
            Error::Malformed(msg) => write!(f, "Malformed oracle output: {}", msg),
            Error::PromptNotFound(id) => write!(f, "Prompt not found: {}", id),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Timeout | Error::Malformed(_) | Error::PromptNotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
