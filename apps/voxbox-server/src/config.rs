//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file given
//! with `--config`, `VOXBOX__*` environment variables (`__` separates
//! sections, e.g. `VOXBOX__DATABASE__DSN`), then command-line overrides.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use voxbox_db::DbConfig;
use voxbox_tenant_resolver::TenantResolverConfig;

const ENV_PREFIX: &str = "VOXBOX__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DbConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tenancy: TenantResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
    /// Directory for the daily rolling log file. Console only when unset.
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
            file_dir: None,
        }
    }
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
}

impl AppConfig {
    /// Loads defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    /// Returns an error when a source cannot be read or does not match the
    /// config schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .extract()
            .context("failed to load configuration")
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr.set_port(port);
        }
        let level = match cli.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            level.clone_into(&mut self.logging.level);
        }
    }

    /// Startup checks beyond what deserialization enforces.
    ///
    /// # Errors
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        if self.tenancy.host_tenancy_name.trim().is_empty() {
            anyhow::bail!("tenancy.host_tenancy_name must not be empty");
        }
        Ok(())
    }

    /// Effective configuration as pretty JSON, with the DSN password hidden.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_redacted_json(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.database.dsn = voxbox_db::config::redact_dsn(&shown.database.dsn);
        Ok(serde_json::to_string_pretty(&shown)?)
    }
}
