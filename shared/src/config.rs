use anyhow::Result;
use std::env;

#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub rsvp: RsvpConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env_or("DATABASE_HOST", "localhost"),
            port: env_or("DATABASE_PORT", "5432").parse()?,
            username: env_or("DATABASE_USERNAME", "app"),
            password: env_or("DATABASE_PASSWORD", "passwd"),
            database: env_or("DATABASE_NAME", "app"),
        };
        let redis = RedisConfig {
            host: env_or("REDIS_HOST", "localhost"),
            port: env_or("REDIS_PORT", "6379").parse()?,
        };
        let auth = AuthConfig {
            ttl: env_or("AUTH_TOKEN_TTL", "86400").parse()?,
        };
        let rsvp = RsvpConfig {
            // イベント作成から RSVP 受付開始までの待ち時間（秒）
            open_delay_secs: env_or("RSVP_OPEN_DELAY_SECONDS", "60").parse()?,
        };
        Ok(Self {
            database,
            redis,
            auth,
            rsvp,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

#[derive(Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// アクセストークンの有効期限（秒）
    pub ttl: u64,
}

#[derive(Clone)]
pub struct RsvpConfig {
    pub open_delay_secs: i64,
}
