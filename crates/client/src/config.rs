use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the Shopwise API, without a trailing slash.
    pub api_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// `API_URL`, then `PUBLIC_API_URL`, then the local default.
    pub fn from_env() -> Self {
        let url = std::env::var("API_URL")
            .or_else(|_| std::env::var("PUBLIC_API_URL"))
            .unwrap_or_else(|_| {
                tracing::info!("API_URL not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });
        Self::new(url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
