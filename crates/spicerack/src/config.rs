//! Application configuration.
//!
//! Layered as built-in defaults, then the TOML file, then
//! `SPICERACK_<SECTION>__<KEY>` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;

pub const APP_NAME: &str = "spicerack";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `<data dir>/spicerack/spicerack.db`.
    pub path: Option<String>,
    /// Connection attempts at startup before giving up.
    pub connect_attempts: u32,
    /// Pause between connection attempts, in seconds.
    pub connect_retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            connect_attempts: 10,
            connect_retry_delay_secs: 2,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the database file path, expanding `~` and `$VARS`.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => expand_str_path(path),
            None => Ok(default_data_dir()?.join(format!("{APP_NAME}.db"))),
        }
    }

    pub fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_retry_delay_secs)
    }
}

/// Product catalog access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Put the product routes behind authentication.
    pub require_auth: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading environment overrides from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(path: &Path, env: Option<Map<String, String>>) -> Result<Self> {
        let defaults = AppConfig::default();
        let built = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("logging.level", defaults.logging.level)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(&env_prefix())
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .source(env),
            )
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        built
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Default config with a freshly generated JWT secret, as written by `init`.
    pub fn bootstrap() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret = Some(AuthConfig::generate_jwt_secret());
        config
    }
}

/// Write `config` as TOML to `path`, creating parent directories.
pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let toml = toml::to_string_pretty(config).context("serializing config to TOML")?;
    let body = format!(
        "# Configuration for {APP_NAME}\n# File: {}\n\n{toml}",
        path.display()
    );
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

/// Resolve the config file location from an optional override.
pub fn config_file_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => {
            let expanded = expand_path(path)?;
            if expanded.is_dir() {
                Ok(expanded.join("config.toml"))
            } else {
                Ok(expanded)
            }
        }
        None => Ok(default_config_dir()?.join("config.toml")),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    match path.to_str() {
        Some(text) => expand_str_path(text),
        None => Ok(path.to_path_buf()),
    }
}

fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(APP_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join(APP_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine data directory"))
}

fn env_prefix() -> String {
    APP_NAME.to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_with_env(&dir.path().join("missing.toml"), no_env()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.connect_attempts, 10);
        assert_eq!(config.database.connect_retry_delay_secs, 2);
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(config.auth.jwt_secret.is_none());
        assert!(!config.catalog.require_auth);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [server]
            port = 9999

            [auth]
            jwt_secret = "file-secret-that-is-at-least-32-characters"
            token_ttl_secs = 60

            [catalog]
            require_auth = true
            "#,
        )
        .unwrap();

        let config = AppConfig::load_with_env(&path, no_env()).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.token_ttl_secs, 60);
        assert!(config.catalog.require_auth);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 9999\n").unwrap();

        let env = Map::from([
            ("SPICERACK_SERVER__PORT".to_string(), "7000".to_string()),
            (
                "SPICERACK_AUTH__JWT_SECRET".to_string(),
                "env:SOME_SECRET_VAR".to_string(),
            ),
            (
                "SPICERACK_CORS__ALLOWED_ORIGINS".to_string(),
                "http://a.test,http://b.test".to_string(),
            ),
        ]);

        let config = AppConfig::load_with_env(&path, Some(env)).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("env:SOME_SECRET_VAR"));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_bootstrap_config_round_trips_through_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = AppConfig::bootstrap();
        write_config(&path, &config).unwrap();

        let loaded = AppConfig::load_with_env(&path, no_env()).unwrap();
        assert_eq!(loaded.auth.jwt_secret, config.auth.jwt_secret);
        assert!(loaded.auth.validated_secret().is_ok());
    }

    #[test]
    fn test_config_file_path_for_directory() {
        let dir = TempDir::new().unwrap();
        let path = config_file_path(Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("config.toml"));
    }

    #[test]
    fn test_database_path_expansion() {
        let db = DatabaseConfig {
            path: Some("/tmp/spicerack-test/app.db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            db.resolved_path().unwrap(),
            PathBuf::from("/tmp/spicerack-test/app.db")
        );
    }
}
