use std::env;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use irrigation_api::{DEFAULT_LIMIT_ID, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relay {
    /// Buffered server messages per connection before a slow reader lags
    pub channel_capacity: usize,
    /// Buffered inbound messages waiting for the relay loop
    pub command_capacity: usize,
    /// Limit row written by `set-limit` and served by default on `/api/limits`
    pub limit_id: Id,
    /// Drop disconnected device records older than this; unset keeps them forever
    pub device_retention_secs: Option<u64>,
    pub prune_interval_secs: u64,
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
            command_capacity: 100,
            limit_id: DEFAULT_LIMIT_ID,
            device_retention_secs: None,
            prune_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    #[serde(default)]
    pub relay: Relay,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            // Hosting platforms hand the listening port over as a bare `PORT`
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?
            .try_deserialize()?;

        if let Some(migrate) = &settings.database.migration_path {
            if Path::new(migrate).is_dir() {
                let migrate_path = normalize_path(migrate)
                    .map_err(|e| ConfigError::Message(e.to_string()))?
                    .to_string_lossy()
                    .to_string();

                settings.database.migration_path = Some(migrate_path);
            } else {
                tracing::warn!("migration path {} is not a directory, skipping", migrate);
                settings.database.migration_path = None;
            }
        }

        Ok(settings)
    }
}

fn normalize_path(path: &str) -> std::io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_defaults() {
        let relay = Relay::default();

        assert_eq!(relay.limit_id, 11);
        assert!(relay.device_retention_secs.is_none());
        assert!(relay.channel_capacity > 0);
    }

    #[test]
    fn test_normalize_relative_path() {
        let normalized = normalize_path("migrations").unwrap();

        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("migrations"));
    }

    #[test]
    fn test_settings_without_relay_section() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [server]
                host = "127.0.0.1"
                port = 3000

                [logger]
                level = "debug"

                [database]
                clean_start = true
                url = "sqlite::memory:"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.relay.limit_id, 11);
        assert!(settings.database.migration_path.is_none());
    }
}
