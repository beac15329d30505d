//! Resource URIs exposed by the server.
//!
//! Two shapes are recognized:
//! - `matlab://scripts/<name>` for saved scripts
//! - `matlab://documentation/<topic>` for built-in documentation

use regex::Regex;
use std::sync::LazyLock;

/// URI of the getting-started guide.
pub const GETTING_STARTED_URI: &str = "matlab://documentation/getting-started";

/// Topic name of the getting-started guide.
pub const GETTING_STARTED_TOPIC: &str = "getting-started";

/// Markdown body of the getting-started guide.
pub const GETTING_STARTED: &str = include_str!("getting_started.md");

/// MIME type of saved scripts.
pub const MATLAB_MIME_TYPE: &str = "text/x-matlab";

/// MIME type of documentation.
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

const SCRIPTS_PREFIX: &str = "matlab://scripts/";

static SCRIPT_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^matlab://scripts/(.+)$").expect("valid regex"));
static DOCUMENTATION_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^matlab://documentation/(.+)$").expect("valid regex"));

/// A parsed resource URI.
///
/// # Examples
///
/// ```
/// use matlab_mcp_server::resources::ResourceUri;
///
/// assert_eq!(
///     ResourceUri::parse("matlab://scripts/plot1"),
///     Some(ResourceUri::Script("plot1".to_string()))
/// );
/// assert_eq!(ResourceUri::parse("file:///etc/passwd"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// A saved script; the name is not yet validated
    Script(String),
    /// A documentation topic
    Documentation(String),
}

impl ResourceUri {
    /// Classifies `uri`, returning `None` if it matches neither shape.
    ///
    /// Script URIs are checked first.
    #[must_use]
    pub fn parse(uri: &str) -> Option<Self> {
        if let Some(caps) = SCRIPT_URI_REGEX.captures(uri) {
            return Some(Self::Script(caps[1].to_string()));
        }

        DOCUMENTATION_URI_REGEX
            .captures(uri)
            .map(|caps| Self::Documentation(caps[1].to_string()))
    }
}

/// Returns the resource URI of the script with file stem `name`.
#[must_use]
pub fn script_uri(name: &str) -> String {
    format!("{SCRIPTS_PREFIX}{name}")
}
