//! MCP server for generating and running MATLAB scripts.
//!
//! This crate exposes a [`MatlabEngine`](matlab_mcp_core::MatlabEngine)
//! over the Model Context Protocol on stdio.
//!
//! # Architecture
//!
//! The server implements two tools:
//!
//! 1. **`generate_matlab_script`** - Save MATLAB code as `<scriptName>.m`
//! 2. **`execute_matlab_script`** - Run a saved script, pausing before exit
//!
//! and two kinds of resources:
//!
//! - `matlab://documentation/getting-started` - Usage guide (markdown)
//! - `matlab://scripts/<name>` - Content of each saved script
//!
//! # Examples
//!
//! ```no_run
//! use matlab_mcp_core::{EngineConfig, MatlabEngine};
//! use matlab_mcp_server::service::MatlabService;
//! use rmcp::ServiceExt;
//! use rmcp::transport::stdio;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = MatlabEngine::new(EngineConfig::from_env(1))?;
//! let service = MatlabService::new(engine).serve(stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # State Management
//!
//! Whether MATLAB can be started is probed on the first tool call and cached
//! for the life of the process. See [`state::AvailabilityState`].

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod resources;
pub mod service;
pub mod state;
pub mod types;

pub use service::MatlabService;
pub use state::AvailabilityState;
pub use types::{ExecuteScriptParams, GenerateScriptParams};
