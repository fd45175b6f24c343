use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/airwave.json";

/// Static seed identity for one simulated contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub handle: String,
}

impl Identity {
    pub fn new(name: &str, handle: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: handle.to_string(),
        }
    }
}

/// Tuning knobs for the proximity simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Fixed roster of simulated contacts, established at construction.
    #[serde(default = "default_roster")]
    pub roster: Vec<Identity>,
    /// Period of the random-walk tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Uniform signal jitter applied per tick, in +/- units of signal.
    #[serde(default = "default_jitter_signal")]
    pub jitter_signal: f64,
    /// Uniform distance jitter applied per tick, in +/- meters.
    #[serde(default = "default_jitter_distance")]
    pub jitter_distance_m: f64,
    /// Number of bars on the signal meter.
    #[serde(default = "default_total_bars")]
    pub total_bars: u8,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            tick_ms: default_tick_ms(),
            jitter_signal: default_jitter_signal(),
            jitter_distance_m: default_jitter_distance(),
            total_bars: default_total_bars(),
        }
    }
}

/// Tuning knobs for a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Sliding-window rate limit: at most this many sends per window.
    #[serde(default = "default_max_messages_per_window")]
    pub max_messages_per_window: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Delay before the simulated contact replies.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_messages_per_window: default_max_messages_per_window(),
            window_ms: default_window_ms(),
            reply_delay_ms: default_reply_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_roster() -> Vec<Identity> {
    vec![
        Identity::new("Alex Rivera", "@alex"),
        Identity::new("Sam Lee", "@sam"),
        Identity::new("Jordan Kim", "@jordan"),
        Identity::new("Taylor Brooks", "@taylor"),
        Identity::new("Casey Morgan", "@casey"),
    ]
}

fn default_tick_ms() -> u64 {
    1500
}

fn default_jitter_signal() -> f64 {
    0.075
}

fn default_jitter_distance() -> f64 {
    3.0
}

fn default_total_bars() -> u8 {
    5
}

fn default_max_message_chars() -> usize {
    500
}

fn default_max_messages_per_window() -> usize {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_reply_delay_ms() -> u64 {
    1000
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.simulator.roster.len(), 5);
        assert_eq!(config.simulator.tick_ms, 1500);
        assert_eq!(config.simulator.total_bars, 5);
        assert_eq!(config.chat.max_message_chars, 500);
        assert_eq!(config.chat.max_messages_per_window, 10);
        assert_eq!(config.chat.window_ms, 60_000);
        assert_eq!(config.chat.reply_delay_ms, 1000);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"chat": {"window_ms": 5000}}"#).expect("valid json");
        assert_eq!(config.chat.window_ms, 5000);
        assert_eq!(config.chat.max_messages_per_window, 10);
        assert_eq!(config.simulator.tick_ms, 1500);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config("does/not/exist.json");
        assert_eq!(config.simulator.roster.len(), 5);
    }
}
