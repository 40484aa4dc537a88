use std::env;
use thiserror::Error;

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and pulled
/// into handlers through `FromRef` as part of the shared `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls secret requirements and log format.
    pub env: Env,
    // Database connection string (Postgres).
    pub db_url: String,
    // Upper bound on pooled database connections.
    pub db_max_connections: u32,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // HMAC secret signing the session cookie.
    pub session_secret: String,
    // Name of the session cookie.
    pub session_cookie: String,
    // Lifetime of an issued session token, in seconds.
    pub session_ttl_secs: i64,
    // bcrypt work factor applied at signup.
    pub bcrypt_cost: u32,
}

/// Env
///
/// Defines the runtime context: relaxed defaults for local development,
/// explicit secrets and JSON logs in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

const LOCAL_DB_URL: &str = "postgres://localhost:5432/blog";
const LOCAL_SESSION_SECRET: &str = "local-development-session-secret";
const DEFAULT_COOKIE: &str = "vsauth";
const DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_BCRYPT_COST: u32 = 10;
const MIN_PRODUCTION_SECRET_LEN: usize = 32;
// Work-factor range bcrypt accepts.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: LOCAL_DB_URL.to_string(),
            db_max_connections: 5,
            bind_addr: "127.0.0.1:3000".to_string(),
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_cookie: DEFAULT_COOKIE.to_string(),
            session_ttl_secs: DEFAULT_TTL_SECS,
            // Lowest cost bcrypt accepts; keeps hashing fast under test.
            bcrypt_cost: 4,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. In production the
    /// database URL and session secret have no fallback; a missing or weak
    /// value is returned as an error so startup stops before serving.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, session_secret) = match env {
            Env::Production => {
                let db_url =
                    env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
                let secret = env::var("SESSION_SECRET")
                    .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
                if secret.len() < MIN_PRODUCTION_SECRET_LEN {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_SECRET",
                        value: "<redacted>".to_string(),
                        reason: format!("must be at least {MIN_PRODUCTION_SECRET_LEN} bytes"),
                    });
                }
                (db_url, secret)
            }
            Env::Local => (
                env::var("DATABASE_URL").unwrap_or_else(|_| LOCAL_DB_URL.to_string()),
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
            ),
        };

        let bcrypt_cost = parse_var("BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: format!(
                    "must lie between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }

        Ok(Self {
            env,
            db_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            session_secret,
            session_cookie: env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| DEFAULT_COOKIE.to_string()),
            session_ttl_secs: parse_var("SESSION_TTL_SECS", DEFAULT_TTL_SECS)?,
            bcrypt_cost,
        })
    }

    /// Cookies are only marked `Secure` in production, where TLS terminates
    /// in front of the service.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
