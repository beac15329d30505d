//! Configuration for the MATLAB engine gateway.
//!
//! # Examples
//!
//! ```
//! use matlab_mcp_core::EngineConfig;
//! use std::time::Duration;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.pause_secs, 1);
//! assert_eq!(config.inline_timeout, Duration::from_secs(30));
//!
//! let custom = EngineConfig::builder()
//!     .executable_path("/opt/matlab/bin/matlab")
//!     .pause_secs(5)
//!     .build();
//! assert_eq!(custom.pause_secs, 5);
//! ```

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the MATLAB executable path.
pub const MATLAB_PATH_ENV: &str = "MATLAB_PATH";

/// Environment variable overriding the scratch directory.
pub const MATLAB_TEMP_DIR_ENV: &str = "MATLAB_TEMP_DIR";

/// Executable used when `MATLAB_PATH` is not set.
pub const DEFAULT_EXECUTABLE: &str = "matlab";

/// Seconds MATLAB stays open after running a saved script.
pub const DEFAULT_PAUSE_SECS: u64 = 1;

/// Wall-clock limit for inline code execution.
pub const DEFAULT_INLINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// MATLAB executable, either a bare command name looked up on `PATH` or
    /// a full path.
    ///
    /// Default: `matlab`
    pub executable_path: PathBuf,

    /// Scratch directory holding saved and temporary scripts.
    ///
    /// Default: `<os temp>/matlab-mcp`
    pub temp_dir: PathBuf,

    /// Seconds to `pause` after running a saved script so figures stay
    /// visible.
    ///
    /// Default: 1
    pub pause_secs: u64,

    /// Timeout applied to inline code execution only.
    ///
    /// Default: 30 seconds
    pub inline_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_EXECUTABLE),
            temp_dir: default_temp_dir(),
            pause_secs: DEFAULT_PAUSE_SECS,
            inline_timeout: DEFAULT_INLINE_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Resolves configuration from `MATLAB_PATH` and `MATLAB_TEMP_DIR`.
    ///
    /// Unset or empty variables fall back to the defaults. The pause is
    /// supplied by the caller since it comes from the command line.
    #[must_use]
    pub fn from_env(pause_secs: u64) -> Self {
        let mut builder = Self::builder().pause_secs(pause_secs);

        if let Some(path) = non_empty_env(MATLAB_PATH_ENV) {
            builder = builder.executable_path(path);
        }
        if let Some(dir) = non_empty_env(MATLAB_TEMP_DIR_ENV) {
            builder = builder.temp_dir(dir);
        }

        builder.build()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - The executable path is empty
    /// - The scratch directory path is empty
    /// - The inline timeout is zero
    ///
    /// # Examples
    ///
    /// ```
    /// use matlab_mcp_core::EngineConfig;
    /// use std::time::Duration;
    ///
    /// assert!(EngineConfig::default().validate().is_ok());
    ///
    /// let invalid = EngineConfig::builder()
    ///     .inline_timeout(Duration::ZERO)
    ///     .build();
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.executable_path.as_os_str().is_empty() {
            return Err(Error::ConfigError {
                message: "MATLAB executable path cannot be empty".to_string(),
            });
        }

        if self.temp_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError {
                message: "Temp directory path cannot be empty".to_string(),
            });
        }

        if self.inline_timeout.is_zero() {
            return Err(Error::ConfigError {
                message: "Inline execution timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Default, Clone)]
pub struct EngineConfigBuilder {
    executable_path: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    pause_secs: Option<u64>,
    inline_timeout: Option<Duration>,
}

impl EngineConfigBuilder {
    /// Sets the MATLAB executable.
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Sets the post-run pause in seconds.
    #[must_use]
    pub const fn pause_secs(mut self, secs: u64) -> Self {
        self.pause_secs = Some(secs);
        self
    }

    /// Sets the inline execution timeout.
    #[must_use]
    pub const fn inline_timeout(mut self, timeout: Duration) -> Self {
        self.inline_timeout = Some(timeout);
        self
    }

    /// Builds the configuration, filling unset fields with defaults.
    #[must_use]
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            executable_path: self
                .executable_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE)),
            temp_dir: self.temp_dir.unwrap_or_else(default_temp_dir),
            pause_secs: self.pause_secs.unwrap_or(DEFAULT_PAUSE_SECS),
            inline_timeout: self.inline_timeout.unwrap_or(DEFAULT_INLINE_TIMEOUT),
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("matlab-mcp")
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
