use std::env;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};

/// Upper bound for `JWT_EXPIRATION_HOURS`, one year.
pub const MAX_JWT_EXPIRATION_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub bcrypt_cost: u32,
    /// Whether `register` may request the ADMIN role.
    pub allow_admin_registration: bool,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration_hours: token_lifetime(parse_var("JWT_EXPIRATION_HOURS", 24 * 7)?)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            allow_admin_registration: parse_var("ALLOW_ADMIN_REGISTRATION", true)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-process store.
    pub database_url: Option<String>,
    pub seed_demo_data: bool,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: parse_var("PORT", 8080)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            seed_demo_data: parse_var("SEED_DEMO_DATA", false)?,
            auth: AuthConfig::from_env()?,
        })
    }
}

fn token_lifetime(hours: u64) -> Result<u64> {
    ensure!(
        (1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours),
        "JWT_EXPIRATION_HOURS must be between 1 and {MAX_JWT_EXPIRATION_HOURS}, got {hours}"
    );
    Ok(hours)
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
