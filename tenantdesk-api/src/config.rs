/// Configuration management for the API server
///
/// Loads configuration from environment variables (and a `.env` file in
/// development) into a typed struct. Core components never read the
/// environment; they receive the values built here.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: session token signing secret, at least 32 characters (required)
/// - `TOKEN_TTL_SECONDS`: session lifetime (default: 86400)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: comma separated origins, `*` for any (default: *)
/// - `PASSWORD_HASH_MEMORY_KIB` / `PASSWORD_HASH_ITERATIONS` /
///   `PASSWORD_HASH_PARALLELISM`: Argon2id cost (default: 65536 / 3 / 4)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `SUPER_ADMIN_TENANT` / `SUPER_ADMIN_EMAIL` / `SUPER_ADMIN_PASSWORD`:
///   platform operator seeded at startup; all three or none
/// - `SUPER_ADMIN_TENANT_NAME` / `SUPER_ADMIN_NAME`: display names for the
///   seeded tenant and user (default: Platform / Platform Admin)
/// - `RUST_LOG`: log filter (default: tenantdesk_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use tenantdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tenantdesk_shared::auth::jwt::{SessionConfig, DEFAULT_TTL_SECONDS};
use tenantdesk_shared::auth::password::HashingConfig;
use tenantdesk_shared::db::pool;
use tenantdesk_shared::models::tenant::RegisterTenant;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session token configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub hashing: HashingSettings,

    /// Log output format
    pub log_format: LogFormat,

    /// Platform operator ensured at startup
    pub super_admin: Option<SuperAdminConfig>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

/// Argon2id cost settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HashingSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Platform operator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdminConfig {
    /// Subdomain of the operator's tenant
    pub tenant_subdomain: String,
    pub tenant_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development
    Pretty,

    /// One JSON object per line, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown LOG_FORMAT '{}', expected 'pretty' or 'json'", other),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = parse_or(&lookup, "API_PORT", 5000u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_seconds = parse_or(&lookup, "TOKEN_TTL_SECONDS", DEFAULT_TTL_SECONDS)?;
        if ttl_seconds <= 0 {
            anyhow::bail!("TOKEN_TTL_SECONDS must be positive");
        }

        let defaults = HashingConfig::default();
        let hashing = HashingSettings {
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

        let super_admin = match (
            lookup("SUPER_ADMIN_TENANT"),
            lookup("SUPER_ADMIN_EMAIL"),
            lookup("SUPER_ADMIN_PASSWORD"),
        ) {
            (Some(tenant_subdomain), Some(email), Some(password)) => Some(SuperAdminConfig {
                tenant_subdomain,
                tenant_name: lookup("SUPER_ADMIN_TENANT_NAME")
                    .unwrap_or_else(|| "Platform".to_string()),
                email,
                password,
                full_name: lookup("SUPER_ADMIN_NAME")
                    .unwrap_or_else(|| "Platform Admin".to_string()),
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "SUPER_ADMIN_TENANT, SUPER_ADMIN_EMAIL and SUPER_ADMIN_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_seconds,
            },
            hashing,
            log_format,
            super_admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            secret: self.jwt.secret.clone(),
            ttl_seconds: self.jwt.ttl_seconds,
        }
    }

    pub fn hashing_config(&self) -> HashingConfig {
        HashingConfig {
            memory_kib: self.hashing.memory_kib,
            iterations: self.hashing.iterations,
            parallelism: self.hashing.parallelism,
        }
    }

    /// Registration payload for the platform operator, if configured
    pub fn super_admin_seed(&self) -> Option<RegisterTenant> {
        self.super_admin.as_ref().map(|admin| RegisterTenant {
            tenant_name: admin.tenant_name.clone(),
            subdomain: admin.tenant_subdomain.clone(),
            admin_email: admin.email.clone(),
            admin_password: admin.password.clone(),
            admin_full_name: admin.full_name.clone(),
        })
    }

    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}
