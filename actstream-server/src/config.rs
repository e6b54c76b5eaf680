use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 120 * 60;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub create_timeout: Duration,
    pub delete_timeout: Duration,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            endpoint: std::env::var("ACTSTREAM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            api_token: std::env::var("ACTSTREAM_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            create_timeout: secs_var("ACTSTREAM_CREATE_TIMEOUT_SECS", DEFAULT_OPERATION_TIMEOUT_SECS)?,
            delete_timeout: secs_var("ACTSTREAM_DELETE_TIMEOUT_SECS", DEFAULT_OPERATION_TIMEOUT_SECS)?,
            poll_interval: secs_var("ACTSTREAM_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            request_timeout: secs_var("ACTSTREAM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        })
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    match std::env::var(name) {
        Ok(value) => parse_secs(name, &value),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, value))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 90 ").unwrap(), Duration::from_secs(90));

        let err = parse_secs("ACTSTREAM_POLL_INTERVAL_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("ACTSTREAM_POLL_INTERVAL_SECS"));
    }
}
