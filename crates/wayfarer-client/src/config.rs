use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerSection,
    #[serde(default)]
    pub bots: Vec<BotSection>,
    #[serde(default)]
    pub supervisor: SupervisorSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub protocol_version: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotSection {
    pub username: String,
    /// Canonical hyphenated UUID; derived from the username when absent.
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_keep_alive_interval_ms")]
    pub keep_alive_interval_ms: u64,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            keep_alive_interval_ms: default_keep_alive_interval_ms(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_keep_alive_interval_ms() -> u64 {
    15_000
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 25565
            protocol_version = 769

            [[bots]]
            username = "wanderer"

            [[bots]]
            username = "scout"
            uuid = "01234567-89ab-3def-8edc-ba9876543210"

            [supervisor]
            reconnect_delay_ms = 2000
            max_reconnect_attempts = 3

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 25565);
        assert_eq!(config.server.protocol_version, 769);
        assert_eq!(config.bots.len(), 2);
        assert_eq!(config.bots[0].username, "wanderer");
        assert!(config.bots[0].uuid.is_none());
        assert!(config.bots[1].uuid.is_some());
        assert_eq!(config.supervisor.reconnect_delay_ms, 2000);
        assert_eq!(config.supervisor.max_reconnect_attempts, 3);
        // keep-alive falls back to its default
        assert_eq!(config.supervisor.keep_alive_interval_ms, 15_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_config_minimal() {
        let toml_str = r#"
            [server]
            host = "localhost"
            port = 25565
            protocol_version = 769
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.bots.is_empty());
        assert_eq!(config.supervisor.reconnect_delay_ms, 5000);
        assert_eq!(config.supervisor.max_reconnect_attempts, 5);
        assert_eq!(config.logging.level, "info");
    }
}
