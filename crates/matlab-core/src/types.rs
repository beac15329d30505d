//! Domain types for the MATLAB gateway.
//!
//! [`ScriptName`] is the one gate for identifiers: it can only be built from
//! a string that MATLAB itself would accept as a variable or script name, so
//! any path built from it stays inside the scratch directory.
//!
//! # Examples
//!
//! ```
//! use matlab_mcp_core::ScriptName;
//!
//! assert!(ScriptName::is_valid("plot1"));
//! assert!(!ScriptName::is_valid("1plot"));
//!
//! let name = ScriptName::parse("my_script").unwrap();
//! assert_eq!(name.file_name(), "my_script.m");
//! ```

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

/// File extension of MATLAB scripts, without the dot.
pub const SCRIPT_EXTENSION: &str = "m";

/// Maximum identifier length accepted by MATLAB (`namelengthmax`).
pub const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,62}$").expect("valid regex"));

/// Validated MATLAB script name (newtype over String).
///
/// # Examples
///
/// ```
/// use matlab_mcp_core::ScriptName;
///
/// let name = ScriptName::parse("fib").unwrap();
/// assert_eq!(name.as_str(), "fib");
/// assert!(ScriptName::parse("a-b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScriptName(String);

impl ScriptName {
    /// Parses and validates a script name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if `name` does not match
    /// `^[A-Za-z][A-Za-z0-9_]{0,62}$`.
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidIdentifier { name })
        }
    }

    /// Returns `true` if `name` is a valid MATLAB identifier.
    #[must_use]
    pub fn is_valid(name: &str) -> bool {
        IDENTIFIER_REGEX.is_match(name)
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the script file name, e.g. `plot1.m`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{SCRIPT_EXTENSION}", self.0)
    }

    /// Consumes the `ScriptName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ScriptName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScriptName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ScriptName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

/// Returns `true` if `stem` names a file directly inside the scratch
/// directory.
///
/// Looser than [`ScriptName::is_valid`]: scripts copied in by hand (e.g.
/// `my-plot.m`) are listed and readable even though they cannot be run by
/// name. Rejects empty stems, path separators, `..` and NUL.
///
/// # Examples
///
/// ```
/// use matlab_mcp_core::is_safe_file_stem;
///
/// assert!(is_safe_file_stem("my-plot"));
/// assert!(!is_safe_file_stem("../secret"));
/// ```
#[must_use]
pub fn is_safe_file_stem(stem: &str) -> bool {
    !stem.is_empty()
        && !stem.contains("..")
        && !stem.contains(['/', '\\', '\0'])
}

/// A script written to the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedScript {
    /// Source text exactly as written
    pub code: String,

    /// Absolute path of the `.m` file
    pub script_path: PathBuf,
}

/// Outcome of one MATLAB invocation.
///
/// Subprocess failures are reported here rather than as an [`Error`]: a
/// failed run has an empty `output` and the failure text in `error`.
///
/// # Examples
///
/// ```
/// use matlab_mcp_core::ExecutionResult;
///
/// let ok = ExecutionResult::success("ans = 2\n", None);
/// assert!(!ok.is_error());
///
/// let failed = ExecutionResult::failure("execution timed out");
/// assert!(failed.is_error());
/// assert!(failed.output.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Captured standard output
    pub output: String,

    /// Captured standard error or failure message, if any
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Creates a result for a process that exited successfully.
    ///
    /// An empty `stderr` is normalized to `None`.
    #[must_use]
    pub fn success(output: impl Into<String>, stderr: Option<String>) -> Self {
        Self {
            output: output.into(),
            error: stderr.filter(|s| !s.is_empty()),
        }
    }

    /// Creates a result for a run that failed or timed out.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            error: Some(message.into()),
        }
    }

    /// Returns `true` if the result carries an error string.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of a best-effort request to close running MATLAB instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownOutcome {
    /// `false` only when MATLAB itself could not be found
    pub success: bool,

    /// Diagnostic text when `success` is `false`
    pub error: Option<String>,
}

impl ShutdownOutcome {
    /// A successful (possibly no-op) shutdown.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed shutdown with a diagnostic message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}
