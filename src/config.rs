//! Application Configuration
//!
//! Endpoints and keys are baked in at build time from the environment
//! (`SUPABASE_URL`, `SUPABASE_ANON_KEY`, `API_BASE_URL`, `LOG_LEVEL`).

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the hosted data store / auth provider
    pub supabase_url: String,
    /// Public (anon) key sent as `apikey` on every data store request
    pub supabase_anon_key: String,
    /// WhatsApp instance control API
    pub api_base_url: String,
    pub log_level: log::LevelFilter,
    /// Pointer travel before a card drag starts
    pub drag_activation_distance: f64,
    /// Re-verification period for channels still pairing
    pub channel_poll_interval: Duration,
    /// Maximum leads loaded onto the board
    pub lead_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Configuration captured from the build environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                "SUPABASE_URL" => option_env!("SUPABASE_URL"),
                "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
                "API_BASE_URL" => option_env!("API_BASE_URL"),
                "LOG_LEVEL" => option_env!("LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            supabase_url: trim_slash(get("SUPABASE_URL").unwrap_or_default()),
            supabase_anon_key: get("SUPABASE_ANON_KEY").unwrap_or_default(),
            api_base_url: trim_slash(get("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())),
            log_level: get("LOG_LEVEL")
                .and_then(|l| log::LevelFilter::from_str(&l).ok())
                .unwrap_or(log::LevelFilter::Info),
            drag_activation_distance: leptos_dragdrop::DEFAULT_ACTIVATION_DISTANCE,
            channel_poll_interval: Duration::from_secs(5),
            lead_page_size: 100,
        }
    }

    /// Data store REST root
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, table)
    }

    /// Auth provider root
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url, path.trim_start_matches('/'))
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.log_level, log::LevelFilter::Info);
        assert_eq!(config.drag_activation_distance, 10.0);
        assert_eq!(config.channel_poll_interval, Duration::from_secs(5));
        assert_eq!(config.lead_page_size, 100);
    }

    #[test]
    fn test_lookup_and_urls() {
        let config = AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://abc.supabase.co/".to_string()),
            "API_BASE_URL" => Some("https://api.example.com/".to_string()),
            "LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(config.rest_url("clients"), "https://abc.supabase.co/rest/v1/clients");
        assert_eq!(config.auth_url("/token"), "https://abc.supabase.co/auth/v1/token");
        assert_eq!(config.api_url("/verify-instance"), "https://api.example.com/verify-instance");
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_bad_log_level_falls_back() {
        let config = AppConfig::from_lookup(|key| (key == "LOG_LEVEL").then(|| "chatty".to_string()));
        assert_eq!(config.log_level, log::LevelFilter::Info);
    }
}
