use std::env;
use std::time::Duration;

use crate::fetcher::RetryPolicy;
use crate::sheets_client::SheetsAuth;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub sheets_api_url: String,
    pub spreadsheet_id: String,
    pub sheets_api_key: Option<String>,
    pub sheets_access_token: Option<String>,
    pub fetch_max_attempts: usize,
    pub fetch_base_delay_ms: u64,
    pub fetch_backoff_factor: f32,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            sheets_api_url: env::var("SHEETS_API_URL")
                .unwrap_or_else(|_| "https://sheets.googleapis.com".to_string()),
            spreadsheet_id: env::var("SPREADSHEET_ID")?,
            sheets_api_key: non_empty_var("SHEETS_API_KEY"),
            sheets_access_token: non_empty_var("SHEETS_ACCESS_TOKEN"),
            fetch_max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(3),
            fetch_base_delay_ms: env::var("FETCH_BASE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            fetch_backoff_factor: env::var("FETCH_BACKOFF_FACTOR")
                .unwrap_or_else(|_| "1.5".to_string())
                .parse::<f32>()
                .ok()
                .filter(|f| *f >= 1.0)
                .unwrap_or(1.5),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Bearer token wins over an API key when both are set.
    pub fn sheets_auth(&self) -> SheetsAuth {
        match (&self.sheets_access_token, &self.sheets_api_key) {
            (Some(token), _) => SheetsAuth::Bearer(token.clone()),
            (None, Some(key)) => SheetsAuth::ApiKey(key.clone()),
            (None, None) => SheetsAuth::None,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.fetch_max_attempts,
            base_delay: Duration::from_millis(self.fetch_base_delay_ms),
            factor: self.fetch_backoff_factor,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
