use std::time::Duration;

use crate::errors::ChatError;

/// Path of the chat function under the API base URL.
pub const CHAT_FUNCTION_PATH: &str = "/functions/v1/ai-chat";

/// Configuration for the chat endpoint client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    /// Full URL of the streaming chat endpoint.
    pub endpoint: String,
    /// Optional key sent as a bearer token.
    pub api_key: Option<String>,
    /// HTTP timeout for the whole request, including the streamed body.
    pub timeout: Duration,
}

impl ChatConfig {
    /// Creates a config for `endpoint` with no key and a 120s timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Creates a config pointing at the chat function under `base_url`.
    pub fn from_base_url(base_url: &str) -> Self {
        Self::new(format!(
            "{}{CHAT_FUNCTION_PATH}",
            base_url.trim_end_matches('/')
        ))
    }

    /// Builds a config from the process environment.
    ///
    /// - `FARMWISE_CHAT_URL`: full endpoint URL, takes precedence.
    /// - `FARMWISE_API_BASE_URL`: base URL; the chat function path is appended.
    /// - `FARMWISE_API_KEY`: optional bearer key.
    /// - `FARMWISE_TIMEOUT_SECS`: optional timeout override in seconds.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ChatError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = if let Some(url) = non_empty("FARMWISE_CHAT_URL") {
            Self::new(url.trim())
        } else if let Some(base) = non_empty("FARMWISE_API_BASE_URL") {
            Self::from_base_url(base.trim())
        } else {
            return Err(ChatError::Config(
                "missing FARMWISE_CHAT_URL or FARMWISE_API_BASE_URL for chat endpoint".into(),
            ));
        };

        if let Some(key) = non_empty("FARMWISE_API_KEY") {
            config.api_key = Some(key.trim().to_string());
        }
        if let Some(raw) = non_empty("FARMWISE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                ChatError::Config(format!("invalid FARMWISE_TIMEOUT_SECS {raw:?}: {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Sets the bearer key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ChatError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ChatError::Config("chat endpoint must not be empty".into()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "chat endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        if self.timeout.is_zero() {
            return Err(ChatError::Config("timeout must be greater than 0".into()));
        }
        Ok(())
    }
}
