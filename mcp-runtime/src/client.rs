use std::collections::BTreeMap;
use std::future::Future;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::McpRuntimeConfig;
use crate::error::ToolError;
use crate::util::client;

/// A single call against the Fider REST API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Unescaped path segments; escaping happens when the URL is built.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `path` is split on `/`; use [`ApiRequest::with_segment`] for values
    /// that may themselves contain a `/`.
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        Self {
            method,
            segments: path
                .as_ref()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl AsRef<str>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl AsRef<str>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl AsRef<str>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl AsRef<str>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Unescaped path, for logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiCallResult {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON, the raw text when the payload is not JSON, or `null` when empty.
    pub body: Value,
}

impl ApiCallResult {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Body rendered for error messages: raw text stays unquoted.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Seam between tool handlers and the remote service.
pub trait FeedbackApi: Send + Sync + 'static {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiCallResult, ToolError>> + Send;
}

/// `reqwest`-backed client for a real Fider instance.
#[derive(Clone, Debug)]
pub struct HttpFeedbackApi {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpFeedbackApi {
    pub fn new(config: &McpRuntimeConfig) -> Result<Self, ToolError> {
        let http = client().map_err(|e| ToolError::Client(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
        })
    }

    fn build_url(&self, request: &ApiRequest) -> Result<reqwest::Url, ToolError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ToolError::Url(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::Url(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (k, v) in &request.query {
                qp.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Fixed headers first, then the caller's, then the bearer token; later
    /// entries replace earlier ones with the same name.
    fn build_headers(&self, request: &ApiRequest) -> Result<HeaderMap, ToolError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ToolError::invalid("headers", format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ToolError::invalid("headers", format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ToolError::invalid("token", e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl FeedbackApi for HttpFeedbackApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiCallResult, ToolError> {
        let url = self.build_url(&request)?;
        tracing::debug!(method = %request.method, %url, "sending Fider API request");

        let headers = self.build_headers(&request)?;
        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ToolError::Network(format!("{} ({e})", self.base_url)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect::<BTreeMap<_, _>>();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ToolError::Network(format!("failed to read response body: {e}")))?;

        Ok(ApiCallResult {
            status,
            headers,
            body: parse_response_body(&bytes),
        })
    }
}

pub fn parse_response_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).to_string()))
}
