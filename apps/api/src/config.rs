use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Organization whose role/process matrix seeds every new organization.
    pub template_organization_id: i32,
    /// Caller-side budget for a single classifier or feedback-generator call.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            template_organization_id: parse_env("TEMPLATE_ORGANIZATION_ID", 1)?,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u16 = parse_env("COMPETENCY_API_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("COMPETENCY_API_TEST_BAD_TEMPLATE", "not-a-number");
        let result: Result<i32> = parse_env("COMPETENCY_API_TEST_BAD_TEMPLATE", 1);
        assert!(result.is_err());
        std::env::remove_var("COMPETENCY_API_TEST_BAD_TEMPLATE");
    }

    #[test]
    fn test_parse_env_reads_template_organization() {
        std::env::set_var("COMPETENCY_API_TEST_TEMPLATE", "7");
        let value: i32 = parse_env("COMPETENCY_API_TEST_TEMPLATE", 1).unwrap();
        assert_eq!(value, 7);
        std::env::remove_var("COMPETENCY_API_TEST_TEMPLATE");
    }
}
