//! Error types for genesis block construction and mining.

use thiserror::Error;

/// Result type alias for genesis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, building or mining a genesis block.
///
/// None of these are recoverable: a search either finds a block, runs out of
/// its configured budget, or stops with one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unsupported configuration value.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A hash primitive required by the selected algorithm is unavailable.
    #[error("Missing dependency: {message}")]
    Dependency { message: String },

    /// A memory-hard hash primitive rejected its parameters or output.
    #[error("Hash error: {message}")]
    Hash { message: String },

    /// The external yespower backend failed during the search.
    #[error("Yespower backend error: {message}")]
    Yespower { message: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Create a missing-dependency error.
    pub fn dependency(message: impl Into<String>) -> Self {
        Error::Dependency {
            message: message.into(),
        }
    }

    /// Create a hash primitive error.
    pub fn hash(message: impl Into<String>) -> Self {
        Error::Hash {
            message: message.into(),
        }
    }

    /// Create a yespower backend error.
    pub fn yespower(message: impl Into<String>) -> Self {
        Error::Yespower {
            message: message.into(),
        }
    }
}
