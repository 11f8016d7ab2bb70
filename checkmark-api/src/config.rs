/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string, or `memory` (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `REDIS_URL`: Redis URL for session storage (optional)
/// - `SESSION_TTL_SECS`: Session lifetime in seconds (default: 1800)
/// - `PASSWORD_MEMORY_KIB`, `PASSWORD_ITERATIONS`, `PASSWORD_PARALLELISM`:
///   Argon2 cost (default: 65536 / 3 / 4)
/// - `RUST_LOG`, `LOG_FORMAT`: read by `main` for the tracing subscriber
///
/// # Example
///
/// ```no_run
/// use checkmark_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use checkmark_shared::auth::password::PasswordParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// `DATABASE_URL` value that selects the in-memory repository
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis URL; sessions stay in process memory when absent
    pub redis_url: Option<String>,

    /// Session configuration
    pub session: SessionConfig,

    /// Argon2 cost parameters
    pub password: PasswordParams,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: plain HTTP
    Development,

    /// Behind HTTPS: HSTS and `Secure` cookies
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("APP_ENV must be 'development' or 'production', got '{}'", other),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Deployment environment
    pub environment: Environment,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or `memory`
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Which repository implementation to run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// Process-local, lost on restart
    Memory,

    /// PostgreSQL at the given URL
    Postgres(String),
}

impl DatabaseConfig {
    /// Backend selected by the URL
    pub fn backend(&self) -> DatabaseBackend {
        if self.url == MEMORY_DATABASE_URL {
            DatabaseBackend::Memory
        } else {
            DatabaseBackend::Postgres(self.url.clone())
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub ttl_secs: u64,
}

impl SessionConfig {
    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing
    /// - A variable has an unparseable value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = get("API_HOST", "0.0.0.0");
        let api_port = get("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT: {}", e))?;
        let environment = get("APP_ENV", "development").parse::<Environment>()?;
        let cors_origins = get("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = get("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS: {}", e))?;

        let redis_url = lookup("REDIS_URL").filter(|url| !url.trim().is_empty());

        let ttl_secs = get("SESSION_TTL_SECS", "1800")
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("SESSION_TTL_SECS: {}", e))?;
        if ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be greater than zero");
        }

        let defaults = PasswordParams::default();
        let password = PasswordParams {
            memory_kib: get("PASSWORD_MEMORY_KIB", &defaults.memory_kib.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PASSWORD_MEMORY_KIB: {}", e))?,
            iterations: get("PASSWORD_ITERATIONS", &defaults.iterations.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PASSWORD_ITERATIONS: {}", e))?,
            parallelism: get("PASSWORD_PARALLELISM", &defaults.parallelism.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PASSWORD_PARALLELISM: {}", e))?,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                environment,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            redis_url,
            session: SessionConfig { ttl_secs },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.api.environment == Environment::Production
    }
}
