use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());
        let token_ttl = env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(24 * 60 * 60);
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl,
        })
    }
}
