use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Overrides [`DEFAULT_BASE_URL`] when set.
pub const BASE_URL_ENV: &str = "USERHUB_BASE_URL";

/// Settings for the HTTP user API client.
///
/// The settings endpoints are simulated locally, so their latency is part of
/// the configuration rather than the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub settings_fetch_delay: Duration,
    pub settings_save_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            settings_fetch_delay: Duration::from_millis(800),
            settings_save_delay: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from the environment when present.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(BASE_URL_ENV) {
            Some(url) if !url.is_empty() => config.with_base_url(url.to_string_lossy()),
            _ => config,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_settings_delays(mut self, fetch: Duration, save: Duration) -> Self {
        self.settings_fetch_delay = fetch;
        self.settings_save_delay = save;
        self
    }

    pub fn user_url(&self, user_id: u64) -> String {
        format!("{}/users/{}", self.base_url.trim_end_matches('/'), user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_placeholder_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.settings_fetch_delay, Duration::from_millis(800));
        assert_eq!(config.settings_save_delay, Duration::from_millis(500));
    }

    #[test]
    fn user_url_ignores_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:3000/");
        assert_eq!(config.user_url(7), "http://localhost:3000/users/7");
    }
}
