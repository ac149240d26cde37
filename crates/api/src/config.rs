use stockroom_index::SearchConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Sliding expiry window for auth tokens, in seconds (default: 4 hours).
    pub token_max_age_secs: i64,
    /// Lifetime of cached user-detail payloads, in seconds (default: `300`).
    pub cache_ttl_secs: u64,
    /// Search engine connection settings.
    pub search: SearchConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `TOKEN_MAX_AGE_SECS`     | `14400`                 |
    /// | `CACHE_TTL_SECS`         | `300`                   |
    /// | `SEARCH_URL`             | `http://localhost:9200` |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let token_max_age_secs: i64 = std::env::var("TOKEN_MAX_AGE_SECS")
            .unwrap_or_else(|_| "14400".into())
            .parse()
            .expect("TOKEN_MAX_AGE_SECS must be a valid i64");

        let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            token_max_age_secs,
            cache_ttl_secs,
            search: SearchConfig::from_env(),
        }
    }

    /// The token sliding-expiry window as a [`chrono::Duration`].
    pub fn token_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_max_age_secs)
    }
}
