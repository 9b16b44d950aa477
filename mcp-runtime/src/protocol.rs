use serde_json::{Value, json};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::RpcError;

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const MCP_SERVER_NAME: &str = "Fider MCP Server";

/// One parsed inbound JSON-RPC message.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    /// `None` for notifications; a `null` id counts as absent.
    pub id: Option<Value>,
    pub method: String,
    pub params: Value,
}

impl IncomingMessage {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Parse one transport line into a message.
///
/// Anything that is not a JSON object is a parse error; the caller answers it
/// with `id: null` because no id can be recovered.
pub fn parse_line(line: &str) -> Result<IncomingMessage, RpcError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| RpcError::parse_error(format!("Parse error: {e}")))?;
    let Value::Object(mut obj) = value else {
        return Err(RpcError::parse_error(
            "Parse error: message must be a JSON object",
        ));
    };

    let id = match obj.remove("id") {
        None | Some(Value::Null) => None,
        Some(id) => Some(id),
    };
    let method = match obj.remove("method") {
        Some(Value::String(method)) => method,
        _ => String::new(),
    };
    let params = obj.remove("params").unwrap_or(Value::Null);

    Ok(IncomingMessage { id, method, params })
}

pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

pub fn error_response(id: Value, error: RpcError) -> Value {
    let mut payload = json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    });
    if let Some(data) = error.data {
        payload["error"]["data"] = data;
    }
    payload
}

/// Write one envelope as a single line and flush it.
pub async fn write_json_line<W>(writer: &mut W, value: &Value) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(value).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON: {e}"),
        )
    })?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}
