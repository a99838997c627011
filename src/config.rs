use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_GRAPHQL_HTTP_URL, DEFAULT_GRAPHQL_WS_URL, DEFAULT_WS_ACK_TIMEOUT_MS,
    DEFAULT_WS_MAX_RETRIES, DEFAULT_WS_RETRY_DELAY_MS,
};

pub struct Config {
    pub graphql_http_url: String,
    pub graphql_ws_url: String,
    pub ws_max_retries: u32,
    pub ws_retry_delay: Duration,
    pub ws_ack_timeout: Duration,
    /// Subscriptions are skipped entirely in non-interactive contexts
    /// (batch jobs, CI); request/response calls stay available.
    pub subscriptions_enabled: bool,
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("graphql_http_url", &self.graphql_http_url)
            .field("graphql_ws_url", &self.graphql_ws_url)
            .field("ws_max_retries", &self.ws_max_retries)
            .field("ws_retry_delay", &self.ws_retry_delay)
            .field("ws_ack_timeout", &self.ws_ack_timeout)
            .field("subscriptions_enabled", &self.subscriptions_enabled)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            graphql_http_url: env::var("PAYTOOL_GRAPHQL_HTTP_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_HTTP_URL.to_string()),
            graphql_ws_url: env::var("PAYTOOL_GRAPHQL_WS_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_WS_URL.to_string()),
            ws_max_retries: env::var("PAYTOOL_WS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WS_MAX_RETRIES),
            ws_retry_delay: Duration::from_millis(
                env::var("PAYTOOL_WS_RETRY_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_WS_RETRY_DELAY_MS),
            ),
            ws_ack_timeout: Duration::from_millis(
                env::var("PAYTOOL_WS_ACK_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_WS_ACK_TIMEOUT_MS),
            ),
            subscriptions_enabled: env::var("PAYTOOL_HEADLESS")
                .map(|v| v != "1" && v.to_lowercase() != "true")
                .unwrap_or(true),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
