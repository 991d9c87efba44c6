/// Configuration management for the API server
///
/// Configuration is read from environment variables, with a `.env` file
/// loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string. When unset it is built from
///   `DB_HOST`, `DB_PORT` (5432), `DB_USER`, `DB_PASSWORD` and `DB_NAME`
/// - `DATABASE_MAX_CONNECTIONS` / `DATABASE_MIN_CONNECTIONS`: pool bounds (10 / 2)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT` or `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGIN`: Comma-separated allowed origins, `*` for any (default: http://localhost:5173)
/// - `APP_ENV`: `development` or `production` (default: production)
/// - `PAYMENT_BASE_URL`: Base URL of simulated payment links (default: https://yourshop.com)
/// - `RUN_MIGRATIONS`: Apply embedded migrations on start (default: true)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use emporium_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use emporium_shared::db::pool::DatabaseConfig;
use std::{env, str::FromStr};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub api: ApiConfig,

    /// Connection pool configuration
    pub database: DatabaseConfig,

    /// Simulated payment provider
    pub payment: PaymentConfig,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Runtime environment
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Payment links are `{base_url}/pay/{order_id}?token=...`
    pub base_url: String,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Error envelopes include internal detail; no HSTS
    Development,

    /// Internal detail is hidden; HSTS enabled
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("APP_ENV must be development or production, got '{}'", other),
        }
    }
}

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_PAYMENT_BASE_URL: &str = "https://yourshop.com";

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn database_url_from_env() -> anyhow::Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }

    let host = env::var("DB_HOST").map_err(|_| {
        anyhow::anyhow!("DATABASE_URL or DB_HOST/DB_USER/DB_NAME environment variables are required")
    })?;
    let user = env::var("DB_USER")
        .map_err(|_| anyhow::anyhow!("DB_USER environment variable is required with DB_HOST"))?;
    let database = env::var("DB_NAME")
        .map_err(|_| anyhow::anyhow!("DB_NAME environment variable is required with DB_HOST"))?;
    let password = env_or("DB_PASSWORD", "");
    let port = parse_env("DB_PORT", 5432u16)?;

    Ok(DatabaseConfig::url_from_parts(&host, port, &user, &password, &database))
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if no database location is configured or a variable
    /// holds an unparseable value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(_) => parse_env("PORT", DEFAULT_PORT)?,
            Err(_) => parse_env("API_PORT", DEFAULT_PORT)?,
        };

        let database = DatabaseConfig {
            url: database_url_from_env()?,
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 2)?,
            ..Default::default()
        };

        if database.min_connections > database.max_connections {
            anyhow::bail!("DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS");
        }

        Ok(Self {
            api: ApiConfig {
                host: env_or("API_HOST", "0.0.0.0"),
                port,
                cors_origins: parse_origins(&env_or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN)),
                environment: parse_env("APP_ENV", Environment::Production)?,
            },
            database,
            payment: PaymentConfig {
                base_url: env_or("PAYMENT_BASE_URL", DEFAULT_PAYMENT_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether internal error detail may be sent to clients
    pub fn is_development(&self) -> bool {
        self.api.environment == Environment::Development
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Configuration for tests and local tooling
    pub fn for_database(url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_PORT,
                cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
                environment: Environment::Development,
            },
            database: DatabaseConfig {
                url: url.into(),
                ..Default::default()
            },
            payment: PaymentConfig {
                base_url: DEFAULT_PAYMENT_BASE_URL.to_string(),
            },
            run_migrations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_database("postgresql://localhost/test");
        config.api.port = 8080;

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.is_development());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173/, https://shop.example.com ,,"),
            vec!["http://localhost:5173", "https://shop.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_allows_any_origin() {
        let mut config = Config::for_database("postgresql://localhost/test");
        assert!(!config.allows_any_origin());

        config.api.cors_origins = parse_origins("*");
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(" Production ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }
}
