use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

/// Failure of a single tool invocation.
///
/// The `Display` text is what the caller sees: the dispatcher wraps it into a
/// JSON-RPC internal error without attaching structured data.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{label} is required (missing '{field}')")]
    MissingParameter { field: &'static str, label: &'static str },

    #[error("Invalid '{field}': {message}")]
    InvalidParameter { field: &'static str, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Failed to reach Fider API: {0}")]
    Network(String),

    #[error("Invalid API URL: {0}")]
    Url(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ToolError {
    pub fn missing(field: &'static str, label: &'static str) -> Self {
        Self::MissingParameter { field, label }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: PARSE_ERROR,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: message.into(),
            data: None,
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        RpcError::internal(format!("Tool execution failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_message_names_the_field() {
        let err = ToolError::missing("number", "Post number");
        assert_eq!(err.to_string(), "Post number is required (missing 'number')");
    }

    #[test]
    fn tool_errors_become_internal_rpc_errors() {
        let rpc: RpcError = ToolError::Remote {
            status: 500,
            body: "\"boom\"".to_string(),
        }
        .into();
        assert_eq!(rpc.code, INTERNAL_ERROR);
        assert_eq!(rpc.message, "Tool execution failed: HTTP 500: \"boom\"");
        assert!(rpc.data.is_none());
    }
}
