use crate::error::{Error, Result};
use crate::recommend::{CachePolicy, RecommenderOptions, UnknownTagPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub recommender: RecommenderConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub api_rate_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub cache_policy: CachePolicy,
    pub unknown_tag_policy: UnknownTagPolicy,
    pub default_min_calories: f64,
    pub default_max_calories: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_query_tokens: usize,
    pub max_token_length: usize,
    pub max_results: usize,
    pub max_request_body_size: usize,
}

impl RecommenderConfig {
    pub fn options(&self) -> RecommenderOptions {
        RecommenderOptions {
            cache_policy: self.cache_policy,
            unknown_tag_policy: self.unknown_tag_policy,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env_or(name, default)
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

/// Parse `disabled`, `invalidate`, or `ttl` (with a TTL in seconds)
pub fn parse_cache_policy(name: &str, ttl_seconds: u64) -> Result<CachePolicy> {
    match name.trim().to_lowercase().as_str() {
        "disabled" | "off" | "none" => Ok(CachePolicy::Disabled),
        "invalidate" | "until_invalidated" => Ok(CachePolicy::UntilInvalidated),
        "ttl" => Ok(CachePolicy::Ttl(Duration::from_secs(ttl_seconds))),
        other => Err(Error::Config(format!(
            "Invalid CACHE_POLICY value '{other}', expected disabled, invalidate, or ttl"
        ))),
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env_or("DATABASE_URL", "sqlite:./data/foodscope.db");

        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", "3000")?;
        let external_url = std::env::var("EXTERNAL_URL").ok();
        let api_rate_limit = parse_env("API_RATE_LIMIT", "100")?;

        let max_connections = parse_env("DATABASE_MAX_CONNECTIONS", "10")?;
        let min_connections = parse_env("DATABASE_MIN_CONNECTIONS", "1")?;
        let connection_timeout_seconds = parse_env("DATABASE_CONNECTION_TIMEOUT", "30")?;
        let idle_timeout_seconds = parse_env("DATABASE_IDLE_TIMEOUT", "600")?;

        let cache_ttl_seconds = parse_env("CACHE_TTL_SECONDS", "300")?;
        let cache_policy =
            parse_cache_policy(&env_or("CACHE_POLICY", "invalidate"), cache_ttl_seconds)?;
        let unknown_tag_policy = env_or("UNKNOWN_TAG_POLICY", "skip").parse()?;
        let default_min_calories = parse_env("DEFAULT_MIN_CALORIES", "0")?;
        let default_max_calories = parse_env("DEFAULT_MAX_CALORIES", "10000")?;

        let max_query_tokens = parse_env("MAX_QUERY_TOKENS", "100")?;
        let max_token_length = parse_env("MAX_TOKEN_LENGTH", "64")?;
        let max_results = parse_env("MAX_RESULTS", "500")?;
        let max_request_body_size = parse_env("MAX_REQUEST_BODY_SIZE", "65536")?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                external_url,
                api_rate_limit,
            },
            recommender: RecommenderConfig {
                cache_policy,
                unknown_tag_policy,
                default_min_calories,
                default_max_calories,
            },
            limits: LimitsConfig {
                max_query_tokens,
                max_token_length,
                max_results,
                max_request_body_size,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if let Some(url) = &self.server.external_url {
            url::Url::parse(url)?;
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(Error::Config(
                "DATABASE_MIN_CONNECTIONS exceeds DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        if let CachePolicy::Ttl(ttl) = self.recommender.cache_policy {
            if ttl.is_zero() {
                return Err(Error::Config(
                    "CACHE_TTL_SECONDS must be non-zero with the ttl policy".to_string(),
                ));
            }
        }

        if !self.recommender.default_min_calories.is_finite()
            || !self.recommender.default_max_calories.is_finite()
        {
            return Err(Error::Config(
                "DEFAULT_MIN_CALORIES and DEFAULT_MAX_CALORIES must be finite numbers".to_string(),
            ));
        }

        if self.recommender.default_min_calories > self.recommender.default_max_calories {
            return Err(Error::Config(
                "DEFAULT_MIN_CALORIES exceeds DEFAULT_MAX_CALORIES".to_string(),
            ));
        }

        if self.limits.max_query_tokens == 0 || self.limits.max_token_length == 0 {
            return Err(Error::Config("Query limits must be non-zero".to_string()));
        }

        if self.limits.max_results == 0 {
            return Err(Error::Config("MAX_RESULTS must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Base URL clients should use to reach the server
    pub fn server_url(&self) -> String {
        self.server
            .external_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            external_url: None,
            api_rate_limit: 100,
        },
        recommender: RecommenderConfig {
            cache_policy: CachePolicy::UntilInvalidated,
            unknown_tag_policy: UnknownTagPolicy::Skip,
            default_min_calories: 0.0,
            default_max_calories: 10000.0,
        },
        limits: LimitsConfig {
            max_query_tokens: 100,
            max_token_length: 64,
            max_results: 500,
            max_request_body_size: 65536,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        let mut settings = test_settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.recommender.cache_policy = CachePolicy::Ttl(Duration::ZERO);
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.recommender.default_min_calories = 500.0;
        settings.recommender.default_max_calories = 100.0;
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.limits.max_results = 0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        for bad in [f64::NAN, f64::INFINITY] {
            let mut settings = test_settings();
            settings.recommender.default_max_calories = bad;
            assert!(matches!(settings.validate(), Err(Error::Config(_))));

            let mut settings = test_settings();
            settings.recommender.default_min_calories = bad;
            assert!(matches!(settings.validate(), Err(Error::Config(_))));
        }

        let mut settings = test_settings();
        settings.server.external_url = Some("not a url".to_string());
        assert!(matches!(settings.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_cache_policy() {
        assert_eq!(parse_cache_policy("off", 10).unwrap(), CachePolicy::Disabled);
        assert_eq!(
            parse_cache_policy("invalidate", 10).unwrap(),
            CachePolicy::UntilInvalidated
        );
        assert_eq!(
            parse_cache_policy("TTL", 10).unwrap(),
            CachePolicy::Ttl(Duration::from_secs(10))
        );
        assert!(parse_cache_policy("sometimes", 10).is_err());
    }

    #[test]
    fn test_server_url() {
        let mut settings = test_settings();
        assert_eq!(settings.server_url(), "http://127.0.0.1:3000");

        settings.server.external_url = Some("https://foodscope.example".to_string());
        assert_eq!(settings.server_url(), "https://foodscope.example");
    }
}
