use std::env;

use anyhow::{Context, Result};
use typed_builder::TypedBuilder;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 50;

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct AppConfig {
    #[builder(setter(into))]
    pub database_url: String,
    #[builder(default = DEFAULT_PORT)]
    pub port: u16,
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
    #[builder(default = true)]
    pub run_migrations: bool,
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `PORT`, `NEWSDESK_MAX_CONNECTIONS` and
    /// `NEWSDESK_RUN_MIGRATIONS`. Call `dotenvy::dotenv()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT {v:?}"))?,
            None => DEFAULT_PORT,
        };
        let max_connections = match lookup("NEWSDESK_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid NEWSDESK_MAX_CONNECTIONS {v:?}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let run_migrations = match lookup("NEWSDESK_RUN_MIGRATIONS") {
            Some(v) => parse_flag(&v)
                .with_context(|| format!("Invalid NEWSDESK_RUN_MIGRATIONS {v:?}"))?,
            None => true,
        };

        Ok(Self {
            database_url,
            port,
            max_connections,
            run_migrations,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true or false, got {other:?}"),
    }
}
