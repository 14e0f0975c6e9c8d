use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key, sent as the `api_key` query parameter
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB v4 read access token, preferred over the API key when set
    #[serde(default)]
    pub tmdb_bearer_token: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// OpenAI API key
    pub openai_api_key: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat model used for ranking
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name, reported by the health check
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Origins allowed by CORS (comma-separated in the environment)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Requests allowed per client address within one window
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate limit window length in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Key the rate limiter on the first `x-forwarded-for` address
    #[serde(default)]
    pub trust_forwarded_for: bool,

    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Number of recommendations returned per request
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Directory with the questionnaire UI, served for non-API paths
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_rate_limit_max() -> u32 {
    30
}

fn default_rate_limit_window_secs() -> u64 {
    15 * 60
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_recommendation_count() -> usize {
    6
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.recommendation_count == 0 {
            anyhow::bail!("RECOMMENDATION_COUNT must be at least 1");
        }
        if config.rate_limit_max == 0 || config.rate_limit_window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_MAX and RATE_LIMIT_WINDOW_SECS must be positive");
        }

        Ok(config)
    }

    /// Whether any TMDB credential is configured
    pub fn has_tmdb_credentials(&self) -> bool {
        self.tmdb_bearer_token.is_some() || self.tmdb_api_key.is_some()
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(vars(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.recommendation_count, 6);
        assert_eq!(config.rate_limit_max, 30);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(900));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(!config.trust_forwarded_for);
        assert!(!config.has_tmdb_credentials());
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_missing_openai_key_is_an_error() {
        let result = Config::from_vars(vars(&[("TMDB_API_KEY", "abc")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_and_lists() {
        let config = Config::from_vars(vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TMDB_BEARER_TOKEN", "token"),
            ("PORT", "8080"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://a.example,https://b.example"),
            ("RECOMMENDATION_COUNT", "4"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "production");
        assert!(config.has_tmdb_credentials());
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.recommendation_count, 4);
    }

    #[test]
    fn test_zero_recommendation_count_rejected() {
        let result = Config::from_vars(vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("RECOMMENDATION_COUNT", "0"),
        ]));
        assert!(result.is_err());
    }
}
