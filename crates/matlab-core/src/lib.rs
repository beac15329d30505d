//! Core gateway for running MATLAB scripts on behalf of MCP clients.
//!
//! This crate owns everything that touches the filesystem or spawns the
//! MATLAB executable. The MCP-facing server crate only translates requests
//! into calls on [`MatlabEngine`].
//!
//! # Architecture
//!
//! The core consists of:
//! - [`EngineConfig`]: executable path, scratch directory, post-run pause
//! - [`ScriptName`]: the validated identifier scripts are saved and run under
//! - [`MatlabEngine`]: script persistence, execution, availability probe
//! - [`Error`]: error hierarchy shared by all operations

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod engine;
mod error;
mod types;

pub use config::{
    DEFAULT_EXECUTABLE, DEFAULT_INLINE_TIMEOUT, DEFAULT_PAUSE_SECS, EngineConfig,
    EngineConfigBuilder, MATLAB_PATH_ENV, MATLAB_TEMP_DIR_ENV,
};
pub use engine::{MatlabEngine, NO_OUTPUT_PLACEHOLDER, TIMEOUT_MESSAGE};
pub use error::{Error, Result};
pub use types::{
    ExecutionResult, GeneratedScript, MAX_IDENTIFIER_LEN, SCRIPT_EXTENSION, ScriptName,
    ShutdownOutcome, is_safe_file_stem,
};
