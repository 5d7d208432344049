use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://www.detik.com/search/searchall";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) newsharvest/0.1";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub search_url: String,
    pub user_agent: String,
    pub http_timeout: Duration,
    /// Upper bound on one `/search` call; the run is cancelled when it expires.
    pub search_deadline: Duration,
    pub detail_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok(); // Load .env file if present
        Ok(Config {
            bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:5000"),
            search_url: get_env_or_default("DETIK_SEARCH_URL", DEFAULT_SEARCH_URL),
            user_agent: get_env_or_default("USER_AGENT", DEFAULT_USER_AGENT),
            http_timeout: Duration::from_secs(get_env_parsed("HTTP_TIMEOUT_SECS", 30)?),
            search_deadline: Duration::from_secs(get_env_parsed("SEARCH_DEADLINE_SECS", 300)?),
            detail_concurrency: get_env_parsed::<usize>("DETAIL_CONCURRENCY", 4)?.max(1),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:5000".to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(30),
            search_deadline: Duration::from_secs(300),
            detail_concurrency: 4,
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for environment variable {key}: {value:?}")),
        Err(_) => Ok(default),
    }
}
