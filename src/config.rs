use serde::Deserialize;
use std::time::Duration;

/// Name of the environment variable overriding the listen address.
const LISTEN_ADDR_ENV: &str = "TASMOTA_EXPORTER_LISTEN_ADDR";

/// Configuration of this application
#[derive(Deserialize, Debug, Clone)]
pub struct Config {

    /// Address the scrape endpoint listens on
    #[serde(default = "default_listen_addr")]
    listen_addr: String,

    // Network timeout towards the plugs, in milliseconds
    #[serde(default = "default_network_timeout_ms")]
    network_timeout_ms: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_network_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Config {
        Config {
            listen_addr: default_listen_addr(),
            network_timeout_ms: default_network_timeout_ms(),
        }
    }
}

impl Config {

    // Read the config file from 'config.json', falling back to defaults
    // when the file does not exist
    pub fn load() -> Config {
        let mut config = match std::fs::read_to_string("config.json") {
            Ok(text) => serde_json::from_str(&text)
                .expect("config file could not be parsed as JSON"),
            Err(_) => Config::default(),
        };

        if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
            if !addr.is_empty() {
                config.listen_addr = addr;
            }
        }

        config
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Network connection timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }
}
