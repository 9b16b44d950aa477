use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value, json};

use crate::McpRuntimeConfig;
use crate::client::{FeedbackApi, HttpFeedbackApi};
use crate::error::{RpcError, ToolError};
use crate::protocol::{
    IncomingMessage, MCP_PROTOCOL_VERSION, MCP_SERVER_NAME, error_response, parse_line,
    success_response,
};
use crate::tools::{self, ToolKind, tool_definitions};

/// JSON-RPC dispatcher. Shared across request tasks; the only mutable state is
/// the informational `initialized` flag.
pub struct McpServer<A = HttpFeedbackApi> {
    api: A,
    initialized: AtomicBool,
}

impl McpServer<HttpFeedbackApi> {
    pub fn new(config: &McpRuntimeConfig) -> Result<Self, ToolError> {
        Ok(Self::with_api(HttpFeedbackApi::new(config)?))
    }
}

impl<A: FeedbackApi> McpServer<A> {
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Handle one raw transport line. Returns the response envelope, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let response = match parse_line(line) {
            Ok(message) => self.handle_message(message).await,
            Err(err) => {
                tracing::warn!(error = %err.message, "rejecting unparsable message");
                Some(error_response(Value::Null, err))
            }
        };
        if let Some(response) = &response {
            tracing::debug!(%response, "sending response");
        }
        response
    }

    pub async fn handle_message(&self, message: IncomingMessage) -> Option<Value> {
        let IncomingMessage { id, method, params } = message;

        if matches!(method.as_str(), "initialized" | "notifications/initialized") {
            self.mark_initialized();
            return id.map(|id| success_response(id, json!({})));
        }

        let Some(id) = id else {
            // Notifications never get a response, known method or not.
            tracing::debug!(%method, "ignoring notification");
            return None;
        };

        Some(match self.handle_request(&method, params).await {
            Ok(payload) => success_response(id, payload),
            Err(err) => error_response(id, err),
        })
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn mark_initialized(&self) {
        if !self.initialized.swap(true, Ordering::AcqRel) {
            tracing::info!("client initialized - server ready for requests");
        }
    }

    pub fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    pub fn tools_list_payload(&self) -> Value {
        json!({ "tools": tool_definitions() })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let name = params.get("name").and_then(Value::as_str);
        match self.call_tool(name, params.get("arguments")).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::error!(
                    tool = name.unwrap_or_default(),
                    error = %err,
                    "tool execution failed"
                );
                Err(err.into())
            }
        }
    }

    async fn call_tool(
        &self,
        name: Option<&str>,
        arguments: Option<&Value>,
    ) -> Result<Value, ToolError> {
        let kind = name
            .and_then(ToolKind::from_name)
            .ok_or_else(|| ToolError::UnknownTool(name.unwrap_or("<missing name>").to_string()))?;

        let args = match arguments {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(ToolError::InvalidArguments(
                    "'arguments' must be an object".to_string(),
                ));
            }
        };

        tools::execute(&self.api, kind, &args).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::client::{ApiCallResult, ApiRequest};

    struct StubApi {
        status: u16,
        body: Value,
        fail_network: bool,
        calls: Mutex<Vec<ApiRequest>>,
    }

    impl StubApi {
        fn responding(status: u16, body: Value) -> Self {
            Self {
                status,
                body,
                fail_network: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                fail_network: true,
                ..Self::responding(200, Value::Null)
            }
        }

        fn calls(&self) -> Vec<ApiRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FeedbackApi for StubApi {
        async fn send(&self, request: ApiRequest) -> Result<ApiCallResult, ToolError> {
            self.calls.lock().unwrap().push(request);
            if self.fail_network {
                return Err(ToolError::Network("connection refused".to_string()));
            }
            Ok(ApiCallResult {
                status: self.status,
                headers: BTreeMap::new(),
                body: self.body.clone(),
            })
        }
    }

    fn server(api: StubApi) -> McpServer<StubApi> {
        McpServer::with_api(api)
    }

    async fn call(server: &McpServer<StubApi>, name: &str, arguments: Value) -> Value {
        let line = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
        .to_string();
        server
            .handle_line(&line)
            .await
            .expect("tools/call with an id must be answered")
    }

    #[tokio::test]
    async fn initialize_returns_fixed_descriptor() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(response["id"], 0);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["capabilities"], json!({ "tools": {} }));
        assert_eq!(response["result"]["serverInfo"]["name"], "Fider MCP Server");
    }

    #[tokio::test]
    async fn initialized_notification_sets_flag_silently() {
        let server = server(StubApi::responding(200, Value::Null));
        assert!(!server.is_initialized());
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"initialized"}"#)
            .await;
        assert!(response.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn requests_are_served_before_initialized() {
        let server = server(StubApi::responding(200, json!([])));
        let response = call(&server, "list_tags", json!({})).await;
        assert!(response.get("result").is_some());
        assert!(!server.is_initialized());
    }

    #[tokio::test]
    async fn tools_list_names_match_dispatchable_tools() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":"t","method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response["result"]["tools"].as_array().unwrap();
        let listed: HashSet<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        let dispatchable: HashSet<&str> = ToolKind::ALL.into_iter().map(ToolKind::as_str).collect();
        assert_eq!(listed, dispatchable);
        assert_eq!(tools.len(), 16);
        assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
    }

    #[tokio::test]
    async fn unknown_method_depends_on_id() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":9,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], 9);

        let silent = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/cancelled"}"#)
            .await;
        assert!(silent.is_none());
    }

    #[tokio::test]
    async fn malformed_line_yields_parse_error_with_null_id() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = server.handle_line("{\"id\": 3, ").await.unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn unknown_tool_is_internal_error() {
        let api = StubApi::responding(200, Value::Null);
        let server = server(api);
        let response = call(&server, "close_all_posts", json!({})).await;
        assert_eq!(response["error"]["code"], -32603);
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.contains("Unknown tool: close_all_posts"));
        assert!(server.api().calls().is_empty());
    }

    #[tokio::test]
    async fn missing_parameter_fails_before_any_http_call() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = call(&server, "add_comment", json!({ "number": 4 })).await;
        assert_eq!(response["error"]["code"], -32603);
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.contains("content"), "{message}");
        assert!(server.api().calls().is_empty());
    }

    #[tokio::test]
    async fn duplicate_status_needs_original_number() {
        let server = server(StubApi::responding(200, json!({})));
        let response = call(
            &server,
            "respond_to_post",
            json!({ "number": 8, "status": "duplicate" }),
        )
        .await;
        assert_eq!(response["error"]["code"], -32603);
        assert!(server.api().calls().is_empty());

        let response = call(
            &server,
            "respond_to_post",
            json!({ "number": 8, "status": "duplicate", "originalNumber": 3 }),
        )
        .await;
        assert!(response.get("result").is_some());
        let calls = server.api().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body.as_ref().unwrap()["originalNumber"], 3);
    }

    #[tokio::test]
    async fn get_post_result_embeds_remote_body() {
        let server = server(StubApi::responding(200, json!({ "number": 42, "title": "x" })));
        let response = call(&server, "get_post", json!({ "number": 42 })).await;
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(response["result"]["content"][0]["type"], "text");
        let embedded = text.split_once("\n\n").unwrap().1;
        let parsed: Value = serde_json::from_str(embedded).unwrap();
        assert_eq!(parsed, json!({ "number": 42, "title": "x" }));
    }

    #[tokio::test]
    async fn get_post_not_found_names_the_post() {
        let server = server(StubApi::responding(404, json!({ "error": "missing" })));
        let response = call(&server, "get_post", json!({ "number": 42 })).await;
        assert_eq!(response["error"]["code"], -32603);
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.contains("42"));
        assert!(message.contains("not found"));
    }

    #[tokio::test]
    async fn server_errors_on_mutations_embed_status() {
        let server = server(StubApi::responding(500, Value::String("boom".to_string())));
        for (name, arguments) in [
            ("create_post", json!({ "title": "t" })),
            ("delete_comment", json!({ "post_number": 1, "comment_id": 2 })),
            ("assign_tag", json!({ "post_number": 1, "slug": "bug" })),
        ] {
            let response = call(&server, name, arguments).await;
            assert_eq!(response["error"]["code"], -32603, "{name}");
            let message = response["error"]["message"].as_str().unwrap();
            assert!(message.contains("500"), "{name}: {message}");
            assert!(message.contains("boom"), "{name}: {message}");
        }
        assert_eq!(server.api().calls().len(), 3);
    }

    #[tokio::test]
    async fn network_failures_surface_as_internal_errors() {
        let server = server(StubApi::unreachable());
        let response = call(&server, "list_posts", json!({})).await;
        assert_eq!(response["error"]["code"], -32603);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("connection refused")
        );
    }

    #[tokio::test]
    async fn absent_arguments_default_to_empty() {
        let server = server(StubApi::responding(200, json!([{ "slug": "bug" }])));
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"list_tags"}}"#)
            .await
            .unwrap();
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Available tags:\n\n"));
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = call(&server, "list_tags", json!([1, 2])).await;
        assert_eq!(response["error"]["code"], -32603);
        assert!(server.api().calls().is_empty());
    }

    #[tokio::test]
    async fn tool_call_notification_does_nothing() {
        let server = server(StubApi::responding(200, Value::Null));
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"delete_tag","arguments":{"slug":"bug"}}}"#)
            .await;
        assert!(response.is_none());
        assert!(server.api().calls().is_empty());
    }
}
