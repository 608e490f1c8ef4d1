use std::env;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub cors_origin: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let jwt_ttl = token_ttl(parse_or("JWT_TTL_MINUTES", 15))?;
        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl,
            cors_origin,
            db_max_connections,
        })
    }
}

/// Token lifetime from a minute count. Must be positive and fit a `Duration`.
fn token_ttl(minutes: i64) -> anyhow::Result<Duration> {
    Duration::try_minutes(minutes)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| anyhow::anyhow!("JWT_TTL_MINUTES out of range: {minutes}"))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
