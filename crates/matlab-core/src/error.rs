//! Error types for the MATLAB engine gateway.
//!
//! Identifier and persistence problems are surfaced as errors so callers can
//! reject a request before anything touches the filesystem or spawns MATLAB.
//! Subprocess failures during execution are usually folded into an
//! [`ExecutionResult`](crate::ExecutionResult) instead; the
//! [`Error::SubprocessFailure`] variant exists for the internal runner and
//! for callers that want the raw failure.
//!
//! # Examples
//!
//! ```
//! use matlab_mcp_core::{Error, Result, ScriptName};
//!
//! fn parse(name: &str) -> Result<ScriptName> {
//!     ScriptName::parse(name)
//! }
//!
//! let err = parse("1plot").unwrap_err();
//! assert!(err.is_invalid_identifier());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the MATLAB gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Script name is not a valid MATLAB identifier.
    ///
    /// MATLAB identifiers start with a letter, continue with letters, digits
    /// or underscores, and are at most 63 characters long.
    #[error("Script name must be a valid MATLAB identifier, got: '{name}'")]
    InvalidIdentifier {
        /// The rejected name
        name: String,
    },

    /// Writing a script to the scratch directory failed.
    #[error("Failed to create MATLAB script: {message}")]
    PersistenceFailure {
        /// Description of the write failure
        message: String,
        /// Underlying IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// No script with the requested name exists in the scratch directory.
    #[error("Script {name}.m not found in {}", dir.display())]
    ScriptNotFound {
        /// Script name without extension
        name: String,
        /// Scratch directory that was searched
        dir: PathBuf,
    },

    /// MATLAB could not be spawned, exited non-zero, or timed out.
    ///
    /// The three causes share one variant and differ only in `message`.
    #[error("{message}")]
    SubprocessFailure {
        /// Human readable failure description
        message: String,
    },

    /// Engine configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Unexpected IO failure outside of script persistence.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if this is an invalid identifier error.
    ///
    /// # Examples
    ///
    /// ```
    /// use matlab_mcp_core::Error;
    ///
    /// let err = Error::InvalidIdentifier {
    ///     name: "a-b".to_string(),
    /// };
    /// assert!(err.is_invalid_identifier());
    /// ```
    #[must_use]
    pub const fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. })
    }

    /// Returns `true` if this is a persistence failure.
    #[must_use]
    pub const fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }

    /// Returns `true` if the requested script does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use matlab_mcp_core::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::ScriptNotFound {
    ///     name: "missing".to_string(),
    ///     dir: PathBuf::from("/tmp/matlab-mcp"),
    /// };
    /// assert!(err.is_not_found());
    /// assert_eq!(err.to_string(), "Script missing.m not found in /tmp/matlab-mcp");
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ScriptNotFound { .. })
    }

    /// Returns `true` if this is a subprocess failure.
    #[must_use]
    pub const fn is_subprocess_failure(&self) -> bool {
        matches!(self, Self::SubprocessFailure { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_detection() {
        let err = Error::InvalidIdentifier {
            name: "1plot".to_string(),
        };
        assert!(err.is_invalid_identifier());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("valid MATLAB identifier"));
    }

    #[test]
    fn test_persistence_failure_display() {
        let err = Error::PersistenceFailure {
            message: "disk full".to_string(),
            source: None,
        };
        assert!(err.is_persistence_failure());
        assert_eq!(err.to_string(), "Failed to create MATLAB script: disk full");
    }

    #[test]
    fn test_not_found_detection() {
        let err = Error::ScriptNotFound {
            name: "plot1".to_string(),
            dir: PathBuf::from("/scratch"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_subprocess_failure());
    }

    #[test]
    fn test_subprocess_failure_display_is_message() {
        let err = Error::SubprocessFailure {
            message: "execution timed out".to_string(),
        };
        assert!(err.is_subprocess_failure());
        assert_eq!(err.to_string(), "execution timed out");
    }

    #[test]
    fn test_config_error_detection() {
        let err = Error::ConfigError {
            message: "empty executable path".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_invalid_identifier());
    }
}
