use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Deadline for the full resume analysis call.
    pub analysis_timeout: Duration,
    /// Deadline for the score-only re-evaluation of an edited resume.
    pub rescore_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_base_url: optional_env("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            analysis_timeout: Duration::from_secs(
                optional_env("ANALYSIS_TIMEOUT_SECS", "60")
                    .parse::<u64>()
                    .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            rescore_timeout: Duration::from_secs(
                optional_env("RESCORE_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("RESCORE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            max_upload_bytes: parse_upload_limit(&optional_env("MAX_UPLOAD_MB", "10"))?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_upload_limit(megabytes: &str) -> Result<usize> {
    megabytes
        .parse::<usize>()
        .context("MAX_UPLOAD_MB must be a whole number of megabytes")?
        .checked_mul(1024 * 1024)
        .context("MAX_UPLOAD_MB is too large")
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Configuration for handler tests; never reads the environment.
    pub fn for_tests() -> Self {
        Config {
            google_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            analysis_timeout: Duration::from_secs(60),
            rescore_timeout: Duration::from_secs(30),
            max_upload_bytes: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_limit_is_converted_to_bytes() {
        assert_eq!(parse_upload_limit("10").unwrap(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_upload_limit_overflow_is_an_error() {
        let err = parse_upload_limit(&usize::MAX.to_string()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_upload_limit_must_be_numeric() {
        assert!(parse_upload_limit("ten").is_err());
    }
}
