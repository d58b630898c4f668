use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::storage::StoreConfig;

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub telemetry: TelemetrySection,
    pub profiling: ProfilingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    pub fn load() -> Result<Self> {
        let config_path = env::var("ALBUMS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration from the given file (if it exists) layered under
    /// `ALBUMS_*` environment variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        if config_path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(config_path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ALBUMS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        config.apply_legacy_env();

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    /// Fill unset fields from the variable names used by older deployments
    /// (`DBUSER`, `DBPASS`, `DBADDR`, `DD_SERVICE`, `DD_ENV`, `DD_VERSION`).
    fn apply_legacy_env(&mut self) {
        fill_from_env(&mut self.database.user, "DBUSER");
        fill_from_env(&mut self.database.password, "DBPASS");
        if self.database.address.is_none() {
            self.database.address = env::var("DBADDR").ok().filter(|a| !a.trim().is_empty());
        }

        fill_from_env(&mut self.telemetry.service, "DD_SERVICE");
        fill_from_env(&mut self.telemetry.env, "DD_ENV");
        fill_from_env(&mut self.telemetry.version, "DD_VERSION");
    }

    /// Resolve the album store configuration.
    pub fn store_config(&self) -> Result<StoreConfig> {
        match self.database.backend {
            StoreBackendKind::MySql => Ok(StoreConfig::MySql(self.database.to_runtime()?)),
            StoreBackendKind::Memory => Ok(StoreConfig::Memory),
        }
    }
}

fn fill_from_env(field: &mut String, var: &str) {
    if field.trim().is_empty() {
        if let Ok(value) = env::var(var) {
            *field = value;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackendKind,
    pub user: String,
    pub password: String,
    /// `host[:port]`; falls back to `DBADDR`, then `127.0.0.1:3306`
    pub address: Option<String>,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::MySql,
            user: String::new(),
            password: String::new(),
            address: None,
            name: "recordings".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    #[default]
    MySql,
    Memory,
}

/// Resolved MySQL connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRuntime {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseSection {
    pub fn to_runtime(&self) -> Result<DatabaseRuntime> {
        if self.user.trim().is_empty() {
            bail!("database.user must be specified (or DBUSER set)");
        }
        if self.name.trim().is_empty() {
            bail!("database.name must not be empty");
        }
        if self.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }

        let address = self.address.as_deref().unwrap_or("127.0.0.1:3306");
        let (host, port) = parse_address(address)
            .with_context(|| format!("invalid database.address '{}'", address))?;

        let password = if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        };

        Ok(DatabaseRuntime {
            host,
            port,
            user: self.user.clone(),
            password,
            database: self.name.clone(),
            max_connections: self.max_connections,
            acquire_timeout_secs: self.acquire_timeout_secs,
        })
    }
}

/// Split `host[:port]` into its parts, defaulting the MySQL port.
pub fn parse_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    if address.is_empty() {
        bail!("address is empty");
    }

    match address.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                bail!("address is missing a host");
            }
            let port = port
                .parse::<u16>()
                .with_context(|| format!("invalid port '{}'", port))?;
            Ok((host.to_string(), port))
        }
        None => Ok((address.to_string(), DEFAULT_MYSQL_PORT)),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Identity reported with traces and profiles
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TelemetrySection {
    pub service: String,
    pub env: String,
    pub version: String,
    /// OTLP/gRPC collector endpoint; spans are only exported when set
    pub otlp_endpoint: Option<String>,
}

impl TelemetrySection {
    pub fn service_name(&self) -> &str {
        non_empty_or(&self.service, "album-service")
    }

    pub fn environment(&self) -> &str {
        non_empty_or(&self.env, "prod")
    }

    pub fn service_version(&self) -> &str {
        non_empty_or(&self.version, env!("CARGO_PKG_VERSION"))
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfilingSection {
    pub enabled: bool,
    pub listen: String,
}

impl Default for ProfilingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: "0.0.0.0:9464".to_string(),
        }
    }
}
