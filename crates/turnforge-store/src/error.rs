use std::fmt;

/// Result type for turnforge-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the storage layer
#[derive(Debug)]
pub enum Error {
    /// Schema creation or upgrade failed
    Schema(String),

    /// An event for this (campaign, turn) already exists
    DuplicateTurn { campaign_id: String, turn_no: i64 },

    /// State diff could not be applied; the transaction was rolled back
    DiffApply(String),

    /// Underlying SQLite error
    Sqlite(rusqlite::Error),

    /// JSON (de)serialization of a stored column failed
    Serde(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(msg) => write!(f, "Schema error: {}", msg),
            Error::DuplicateTurn {
                campaign_id,
                turn_no,
            } => write!(
                f,
                "Duplicate turn {} for campaign '{}'",
                turn_no, campaign_id
            ),
            Error::DiffApply(msg) => write!(f, "State diff apply failed: {}", msg),
            Error::Sqlite(err) => write!(f, "SQLite error: {}", err),
            Error::Serde(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Sqlite(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Schema(_) | Error::DuplicateTurn { .. } | Error::DiffApply(_) => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}
