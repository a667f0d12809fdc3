use std::env;

/// Where documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local; contents are lost on restart.
    Memory,
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value `{value}`")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    pub store: StoreBackend,
    /// PostgreSQL connection URL; required for the postgres backend.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// HS256 secret for bearer tokens.
    pub jwt_secret: String,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    pub cors_origins: CorsOrigins,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            store: StoreBackend::Postgres,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 5,
            jwt_secret: "dev-secret-change-me-in-production".to_string(),
            log_level: "info".to_string(),
            cors_origins: CorsOrigins::Any,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `get`, which returns a variable's value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let store = match get("STORE").as_deref() {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORE",
                    value: other.to_string(),
                })
            }
        };
        let database_url = get("DATABASE_URL").filter(|url| !url.is_empty());
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
            store,
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            jwt_secret: get("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.jwt_secret),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_origins: get("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}
