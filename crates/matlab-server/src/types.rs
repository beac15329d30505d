//! Parameter types for the MCP tools.
//!
//! Field names follow the wire format clients already use: `scriptName` for
//! generation and `script_name` for execution.

use schemars::JsonSchema;
use serde::Deserialize;

// ============================================================================
// generate_matlab_script types
// ============================================================================

/// Parameters for saving a MATLAB script.
///
/// # Examples
///
/// ```
/// use matlab_mcp_server::types::GenerateScriptParams;
///
/// let params: GenerateScriptParams = serde_json::from_value(serde_json::json!({
///     "scriptName": "sine_wave",
///     "code": "plot(sin(0:0.1:2*pi));"
/// }))
/// .unwrap();
/// assert_eq!(params.script_name, "sine_wave");
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateScriptParams {
    /// Name for the script file (without .m extension, must be valid MATLAB identifier)
    #[serde(rename = "scriptName")]
    pub script_name: String,

    /// MATLAB code to save
    pub code: String,
}

// ============================================================================
// execute_matlab_script types
// ============================================================================

/// Parameters for running a saved MATLAB script.
///
/// # Examples
///
/// ```
/// use matlab_mcp_server::types::ExecuteScriptParams;
///
/// let params: ExecuteScriptParams =
///     serde_json::from_str(r#"{"script_name": "sine_wave"}"#).unwrap();
/// assert_eq!(params.script_name, "sine_wave");
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteScriptParams {
    /// Name of the script file (without .m extension)
    pub script_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_params_camel_case_name() {
        let params: GenerateScriptParams =
            serde_json::from_value(json!({"scriptName": "plot1", "code": "x = 1;"})).unwrap();
        assert_eq!(params.script_name, "plot1");
        assert_eq!(params.code, "x = 1;");
    }

    #[test]
    fn test_generate_params_missing_name_fails() {
        let result: Result<GenerateScriptParams, _> =
            serde_json::from_value(json!({"code": "x = 1;"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_params_ignores_extra_fields() {
        let params: ExecuteScriptParams =
            serde_json::from_value(json!({"script_name": "plot1", "args": {"n": 3}})).unwrap();
        assert_eq!(params.script_name, "plot1");
    }

    #[test]
    fn test_schema_marks_required_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(GenerateScriptParams)).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("scriptName")));
        assert!(required.contains(&json!("code")));
    }
}
