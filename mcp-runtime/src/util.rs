pub const DEFAULT_BASE_URL: &str = "https://your-fider-instance.com";
pub const LEGACY_BASE_URL_ENV: &str = "FIDER_URL";
pub const USER_AGENT: &str = concat!("Fider-MCP-Server/", env!("CARGO_PKG_VERSION"));

pub fn client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Pick the Fider base URL: explicit flag/`FIDER_BASE_URL`, then the legacy
/// `FIDER_URL` variable, then the placeholder default.
pub fn resolve_base_url(explicit: Option<String>, legacy: Option<String>) -> String {
    let chosen = [explicit, legacy]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    chosen.trim_end_matches('/').to_string()
}

/// Blank tokens are treated as unconfigured.
pub fn normalize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
