use std::fmt;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_API_VERSION: &str = "2023-06-01";
const DEFAULT_PORT: u16 = 3000;

/// Upstream credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters, enough to tell keys apart in diagnostics.
    pub fn hint(&self) -> String {
        self.0.chars().take(4).collect()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}…)", self.hint())
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_version: String,
    /// Log message contents at debug level. Off unless explicitly enabled.
    pub log_payloads: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            api_key: lookup("ANTHROPIC_API_KEY").and_then(ApiKey::new),
            base_url: non_empty("ANTHROPIC_API_BASE_URL")
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: non_empty("ANTHROPIC_MAX_TOKENS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            api_version: non_empty("ANTHROPIC_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            log_payloads: non_empty("RELAY_LOG_PAYLOADS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}
