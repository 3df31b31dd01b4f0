use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in minutes.
    pub jwt_maxage: i64,
    pub port: u16,
    pub db_max_connections: u32,
    pub query_timeout: Duration,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");

        let jwt_maxage = env_or("JWT_MAXAGE", 24 * 60);
        let port = env_or("PORT", 8000);
        let db_max_connections = env_or("DB_MAX_CONNECTIONS", 10);
        let query_timeout_secs = env_or("QUERY_TIMEOUT_SECS", 5);

        Config {
            database_url,
            jwt_secret,
            jwt_maxage,
            port,
            db_max_connections,
            query_timeout: Duration::from_secs(query_timeout_secs),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), key, default)
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has an unparseable value {:?}, using the default", key, value);
            default
        }),
        None => default,
    }
}
