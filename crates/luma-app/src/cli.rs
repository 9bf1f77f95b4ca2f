//! CLI argument definitions for the Luma server.
//!
//! Each setting resolves in the same order: flag, then environment
//! variable, then config file, then built-in default.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

const CONFIG_ENV: &str = "LUMA_CONFIG";
const PORT_ENV: &str = "LUMA_PORT";
const DEFAULT_PORT: u16 = 8000;

/// Luma - groups free-text user intents and the UI interactions behind them.
#[derive(Parser, Debug)]
#[command(name = "luma", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log filter, e.g. `debug` or `luma_engine=trace,info`.
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// `--config`, `$LUMA_CONFIG`, or `~/.luma/config.toml`.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| env_value(CONFIG_ENV))
            .unwrap_or_else(|| luma_home().join("config.toml"))
    }

    /// `--port`, `$LUMA_PORT`, the config value, or 8000 when the config
    /// value is 0. An unparsable `$LUMA_PORT` is skipped.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port
            .or_else(|| env_value(PORT_ENV))
            .or(Some(config_port).filter(|p| *p != 0))
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    /// `--log-level`, `$RUST_LOG`, or the config file's `log_level`.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .or_else(|| env_value("RUST_LOG"))
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Parsed value of an environment variable; `None` if unset or invalid.
fn env_value<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// `~/.luma`, or the working directory when no home is known.
fn luma_home() -> PathBuf {
    let home_var = if cfg!(target_os = "windows") {
        "USERPROFILE"
    } else {
        "HOME"
    };
    match std::env::var_os(home_var) {
        Some(home) => PathBuf::from(home).join(".luma"),
        None => PathBuf::from("."),
    }
}
