//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timers: TimerConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Server networking and general settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connections per IP limit.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: usize,
    /// Server name shown in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Countdown tick interval in milliseconds. One timer unit elapses per
    /// tick, so this is the real-time length of a "second" on every timer.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_connections: default_max_connections(),
            ip_limit: default_ip_limit(),
            name: default_name(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

/// Countdown lengths for the server-owned timers, in timer units.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimerConfig {
    /// Game 1 brainstorm countdown.
    #[serde(default = "default_brainstorm_secs")]
    pub brainstorm_secs: u32,
    /// Game 1 per-pitcher countdown.
    #[serde(default = "default_pitch_secs")]
    pub pitch_secs: u32,
    /// Game 4 per-holder countdown.
    #[serde(default = "default_mug_pitch_secs")]
    pub mug_pitch_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            brainstorm_secs: default_brainstorm_secs(),
            pitch_secs: default_pitch_secs(),
            mug_pitch_secs: default_mug_pitch_secs(),
        }
    }
}

fn default_port() -> u16 {
    3001
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_max_connections() -> usize {
    100
}
fn default_ip_limit() -> usize {
    8
}
fn default_name() -> String {
    "Sendoff".to_string()
}
fn default_tick_interval() -> u64 {
    1000
}
fn default_brainstorm_secs() -> u32 {
    30
}
fn default_pitch_secs() -> u32 {
    20
}
fn default_mug_pitch_secs() -> u32 {
    10
}
