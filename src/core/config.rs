use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the privileged v-* binaries
    pub bin_dir: PathBuf,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// API key the panel front end uses to create sessions
    pub api_key: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_cookie_name() -> String {
    "vpanel_session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.store.bin_dir.as_os_str().is_empty() {
            bail!("store bin_dir must not be empty");
        }

        if self.store.command_timeout_secs == 0 {
            bail!("command_timeout_secs must be greater than 0");
        }

        if self.session.api_key.is_empty() {
            bail!("session api_key must not be empty");
        }

        if self.session.cookie_name.is_empty() {
            bail!("session cookie_name must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
