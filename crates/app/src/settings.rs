//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`config/trackit.toml` unless
//! `--config` says otherwise), overridden by `TRACKIT__*` environment
//! variables, e.g. `TRACKIT__SERVER__PORT=8080`.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config/trackit.toml";
const DEFAULT_SQLITE_PATH: &str = "trackit.db";

#[derive(Debug, Parser)]
#[command(name = "trackit", about = "TrackIt personal finance server")]
pub struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, env = "TRACKIT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Option<Database>,
}

impl Server {
    pub fn database(&self) -> Database {
        self.database
            .clone()
            .unwrap_or_else(|| Database::Sqlite(DEFAULT_SQLITE_PATH.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("auth.token_ttl_minutes", 60)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("TRACKIT").separator("__"))
            .build()?
            .try_deserialize()?;

        if settings.auth.token_ttl_minutes <= 0 {
            return Err(SettingsError::Invalid {
                key: "auth.token_ttl_minutes",
                reason: "must be positive".to_string(),
            });
        }
        Ok(settings)
    }
}
