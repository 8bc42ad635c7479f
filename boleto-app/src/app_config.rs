use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub realtime: RealtimeConfig,
    pub listener: ListenerConfig,
    pub storage: StorageConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    pub ws_url: String,
    #[serde(default = "default_reconnect_seconds")]
    pub reconnect_seconds: u64,
}

fn default_reconnect_seconds() -> u64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListenerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub credentials_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub poll_attempts: u32,
    pub poll_delay_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Settings from the environment (with a prefix of BOLETO)
            .add_source(config::Environment::with_prefix("BOLETO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
