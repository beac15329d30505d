//! MCP server implementation for MATLAB script generation and execution.
//!
//! The `MatlabService` provides two tools:
//! 1. `generate_matlab_script` - Save MATLAB code as a named script
//! 2. `execute_matlab_script` - Run a saved script by name
//!
//! and two kinds of resources: the getting-started guide and one resource
//! per saved script.

use crate::resources::{
    GETTING_STARTED, GETTING_STARTED_TOPIC, GETTING_STARTED_URI, MARKDOWN_MIME_TYPE,
    MATLAB_MIME_TYPE, ResourceUri, script_uri,
};
use crate::state::AvailabilityState;
use crate::types::{ExecuteScriptParams, GenerateScriptParams};
use matlab_mcp_core::{ExecutionResult, GeneratedScript, MatlabEngine, SCRIPT_EXTENSION};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, CallToolRequestMethod, CallToolRequestParam, CallToolResult, Content,
    Implementation, ListResourcesResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
    RawResource, ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, tool, tool_router};
use std::sync::Arc;

/// Tool name gated by the availability check.
///
/// No tool with this name is registered, so the gate never blocks a real
/// call. Kept so inline execution is gated if it is ever exposed.
const INLINE_CODE_TOOL: &str = "execute_matlab_code";

/// Server name reported in `initialize`.
pub const SERVER_NAME: &str = "matlab-mcp";

const MATLAB_UNAVAILABLE: &str = "Error: MATLAB is not available. Please make sure MATLAB is \
     installed and the path is correctly set in the environment variable MATLAB_PATH.";

/// MCP server that saves and runs MATLAB scripts.
///
/// # Examples
///
/// ```no_run
/// use matlab_mcp_core::{EngineConfig, MatlabEngine};
/// use matlab_mcp_server::service::MatlabService;
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
///
/// # async fn example() -> anyhow::Result<()> {
/// let engine = MatlabEngine::new(EngineConfig::from_env(1))?;
/// let service = MatlabService::new(engine).serve(stdio()).await?;
/// service.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MatlabService {
    /// Gateway to the MATLAB executable
    engine: Arc<MatlabEngine>,

    /// Cached result of the MATLAB availability probe
    availability: Arc<AvailabilityState>,

    /// Tool router for MCP protocol
    tool_router: ToolRouter<Self>,
}

impl MatlabService {
    /// Creates a new service around `engine`.
    #[must_use]
    pub fn new(engine: MatlabEngine) -> Self {
        Self::with_availability(engine, Arc::new(AvailabilityState::new()))
    }

    /// Creates a service sharing an existing availability cache.
    #[must_use]
    pub fn with_availability(engine: MatlabEngine, availability: Arc<AvailabilityState>) -> Self {
        Self {
            engine: Arc::new(engine),
            availability,
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the MATLAB gateway.
    #[must_use]
    pub fn engine(&self) -> &MatlabEngine {
        &self.engine
    }

    /// Returns the availability cache, e.g. to invalidate it.
    #[must_use]
    pub fn availability(&self) -> &AvailabilityState {
        &self.availability
    }
}

#[tool_router]
impl MatlabService {
    /// Save MATLAB code as `<scriptName>.m` in the scratch directory.
    #[tool(description = "Generate MATLAB script from a natural language description")]
    async fn generate_matlab_script(
        &self,
        Parameters(params): Parameters<GenerateScriptParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.script_name.is_empty() {
            return Err(McpError::invalid_params("scriptName is required", None));
        }

        match self
            .engine
            .generate_script(&params.script_name, &params.code)
            .await
        {
            Ok(saved) => Ok(CallToolResult::success(vec![Content::text(
                generated_script_text(&params.script_name, &saved),
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error generating MATLAB code: {e}"
            ))])),
        }
    }

    /// Run a saved MATLAB script by name.
    #[tool(
        description = "Execute a MATLAB script by name (script must exist in temp directory)"
    )]
    async fn execute_matlab_script(
        &self,
        Parameters(params): Parameters<ExecuteScriptParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.script_name.is_empty() {
            return Err(McpError::invalid_params("Script name is required", None));
        }

        match self.engine.execute_script(&params.script_name).await {
            Ok(result) => {
                let text = execution_text(&params.script_name, &result);
                if result.is_error() {
                    Ok(CallToolResult::error(vec![Content::text(text)]))
                } else {
                    Ok(CallToolResult::success(vec![Content::text(text)]))
                }
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error executing MATLAB script: {e}"
            ))])),
        }
    }
}

impl MatlabService {
    /// Probes MATLAB on first use and blocks the inline-code tool if it is
    /// unavailable.
    ///
    /// Returns the response to send instead of dispatching, if any.
    async fn availability_guard(&self, tool_name: &str) -> Option<CallToolResult> {
        let engine = Arc::clone(&self.engine);
        let available = self
            .availability
            .get_or_probe(|| async move { engine.check_availability().await })
            .await;

        (!available && tool_name == INLINE_CODE_TOOL)
            .then(|| CallToolResult::error(vec![Content::text(MATLAB_UNAVAILABLE)]))
    }

    /// Builds the resource list: the guide plus one entry per saved script.
    ///
    /// A failure to read the scratch directory is logged and leaves only the
    /// guide.
    async fn list_all_resources(&self) -> Vec<Resource> {
        let mut resources = vec![documentation_resource()];

        match self.engine.list_scripts().await {
            Ok(scripts) => {
                resources.extend(scripts.iter().map(String::as_str).map(script_resource));
            }
            Err(e) => tracing::warn!(error = %e, "Error listing MATLAB scripts"),
        }

        resources
    }

    /// Resolves a resource URI to its contents.
    async fn read_resource_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        match ResourceUri::parse(uri) {
            Some(ResourceUri::Script(name)) => {
                let text = self.engine.read_script(&name).await.map_err(|e| {
                    if e.is_not_found() {
                        McpError::resource_not_found(
                            format!("Script {name}.{SCRIPT_EXTENSION} not found"),
                            Some(serde_json::json!({ "uri": uri })),
                        )
                    } else {
                        McpError::internal_error(format!("Error reading script {name}: {e}"), None)
                    }
                })?;

                Ok(ReadResourceResult {
                    contents: vec![text_contents(text, uri, MATLAB_MIME_TYPE)],
                })
            }
            Some(ResourceUri::Documentation(topic)) if topic == GETTING_STARTED_TOPIC => {
                Ok(ReadResourceResult {
                    contents: vec![text_contents(
                        GETTING_STARTED.to_string(),
                        uri,
                        MARKDOWN_MIME_TYPE,
                    )],
                })
            }
            Some(ResourceUri::Documentation(topic)) => Err(McpError::resource_not_found(
                format!("Documentation not found: {topic}"),
                Some(serde_json::json!({ "uri": uri })),
            )),
            None => Err(McpError::invalid_request(
                format!("Invalid URI format: {uri}"),
                None,
            )),
        }
    }
}

impl ServerHandler for MatlabService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: server_implementation(),
            instructions: Some(
                "Save MATLAB scripts with generate_matlab_script and run them with \
                 execute_matlab_script. Saved scripts are readable as \
                 matlab://scripts/{name} resources."
                    .to_string(),
            ),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if let Some(blocked) = self.availability_guard(&request.name).await {
            return Ok(blocked);
        }

        if !self.tool_router.has_route(&request.name) {
            tracing::debug!(tool = %request.name, "Unknown tool");
            return Err(McpError::method_not_found::<CallToolRequestMethod>());
        }

        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            self.list_all_resources().await,
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_resource_uri(&request.uri).await
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Name and version advertised to clients during initialization.
fn server_implementation() -> Implementation {
    let mut implementation = Implementation::from_build_env();
    implementation.name = SERVER_NAME.to_string();
    implementation.version = env!("CARGO_PKG_VERSION").to_string();
    implementation
}

fn generated_script_text(name: &str, saved: &GeneratedScript) -> String {
    format!(
        "Generated MATLAB script for: \"{name}\"\n\n```matlab\n{}\n```\n\n\
         Generated MATLAB script saved to: {}",
        saved.code,
        saved.script_path.display()
    )
}

fn execution_text(name: &str, result: &ExecutionResult) -> String {
    match &result.error {
        Some(error) => format!("Error executing MATLAB script \"{name}\":\n{error}"),
        None => format!("MATLAB script \"{name}\" execution result:\n{}", result.output),
    }
}

fn documentation_resource() -> Resource {
    let mut raw = RawResource::new(GETTING_STARTED_URI, "MATLAB Getting Started Guide");
    raw.description =
        Some("Basic guide for getting started with MATLAB through the MCP server".to_string());
    raw.mime_type = Some(MARKDOWN_MIME_TYPE.to_string());
    raw.no_annotation()
}

fn script_resource(name: &str) -> Resource {
    let mut raw = RawResource::new(script_uri(name), format!("MATLAB Script: {name}"));
    raw.description = Some(format!("Content of MATLAB script {name}.{SCRIPT_EXTENSION}"));
    raw.mime_type = Some(MATLAB_MIME_TYPE.to_string());
    raw.no_annotation()
}

fn text_contents(text: String, uri: &str, mime: &str) -> ResourceContents {
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(mime.to_string());
    }
    contents
}
