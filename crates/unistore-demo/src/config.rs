//! Demo configuration
//!
//! Loaded from `unistore-demo.toml` in the working directory, then from
//! `<config dir>/unistore-demo/config.toml`, falling back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "unistore-demo.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DemoConfig {
    /// Counter value the store starts with
    #[serde(default = "default_initial_counter")]
    pub initial_counter: i64,

    /// Print every transition to stdout
    #[serde(default = "default_print_transitions")]
    pub print_transitions: bool,

    /// Forward every transition to the logger
    #[serde(default)]
    pub log_transitions: bool,

    /// Simulated latency of the fetch effect
    #[serde(default)]
    pub response_delay_ms: u64,
}

fn default_initial_counter() -> i64 {
    1337
}

fn default_print_transitions() -> bool {
    true
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            initial_counter: default_initial_counter(),
            print_transitions: default_print_transitions(),
            log_transitions: false,
            response_delay_ms: 0,
        }
    }
}

impl DemoConfig {
    /// Load config from CWD first, then the user config directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = load_config_file() {
            match Self::parse(&content) {
                Ok(config) => {
                    log::info!("Loaded demo config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default demo config");
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    let user_config = user_config_path()?;
    match std::fs::read_to_string(&user_config) {
        Ok(content) => {
            log::debug!("Loaded config from {}", user_config.display());
            Some(content)
        }
        Err(_) => None,
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("unistore-demo").join("config.toml"))
}
