/// Configuration for the API server
///
/// Loaded from environment variables (a `.env` file is honored in
/// development).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_RUN_MIGRATIONS`: Apply migrations on startup (default: true)
/// - `DATABASE_CREATE`: Create the database if missing (default: false)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `JWT_ACCESS_TTL_HOURS`: Access token lifetime (default: 24)
/// - `JWT_REFRESH_TTL_DAYS`: Refresh token lifetime (default: 30)
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: Comma separated allowed origins, `*` for any (default: *)
/// - `APP_ENV`: `production` enables HSTS
/// - `SCORING_STRATEGY`: `completion_ratio` or `streak_bonus` (default: completion_ratio)
/// - `SCORE_WEEKLY_DAYS` / `SCORE_MONTHLY_DAYS`: Report windows (default: 7 / 30)
/// - `RUST_LOG`: Log filter, `LOG_FORMAT=json` for JSON logs
///
/// # Example
///
/// ```no_run
/// use habitpilot_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::{bail, Context};
use habitpilot_shared::score::ScoringStrategy;
use std::{env, fmt, str::FromStr};

/// Shortest accepted JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub scoring: ScoringConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Apply pending migrations on startup
    pub run_migrations: bool,

    /// Create the database on startup if it does not exist
    pub create_database: bool,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in hours
    pub access_ttl_hours: i64,

    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_hours", &self.access_ttl_hours)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

/// Score reporting configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Strategy used by the summary endpoint when none is requested
    pub default_strategy: ScoringStrategy,

    /// Length of the weekly window in days
    pub weekly_days: u32,

    /// Length of the monthly window in days
    pub monthly_days: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_strategy: ScoringStrategy::default(),
            weekly_days: 7,
            monthly_days: 30,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{key} environment variable is required"))
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long");
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let production = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let default_strategy = match lookup("SCORING_STRATEGY") {
            Some(raw) => raw.parse::<ScoringStrategy>()?,
            None => ScoringStrategy::default(),
        };

        let scoring = ScoringConfig {
            default_strategy,
            weekly_days: parse_or(&lookup, "SCORE_WEEKLY_DAYS", 7)?,
            monthly_days: parse_or(&lookup, "SCORE_MONTHLY_DAYS", 30)?,
        };
        if scoring.weekly_days == 0 || scoring.monthly_days == 0 {
            bail!("Score windows must be at least one day");
        }

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8080)?,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_or(&lookup, "DATABASE_RUN_MIGRATIONS", true)?,
                create_database: parse_or(&lookup, "DATABASE_CREATE", false)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_hours: parse_or(&lookup, "JWT_ACCESS_TTL_HOURS", 24)?,
                refresh_ttl_days: parse_or(&lookup, "JWT_REFRESH_TTL_DAYS", 30)?,
            },
            scoring,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
