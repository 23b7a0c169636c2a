use anyhow::{bail, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::domain::ClassifierConfig;
use crate::optimizer::SchedulerConfig;

pub const CONFIG_FILE: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "GRIDSHED__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub topology: TopologyConfig,
    pub classifier: ClassifierConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origin: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: false,
            cors_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Capacity given to feeders created without one (kW)
    pub default_feeder_capacity_kw: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            default_feeder_capacity_kw: 1000.0,
        }
    }
}

impl Config {
    /// Layer `config/default.toml` under `GRIDSHED__*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let capacity = self.topology.default_feeder_capacity_kw;
        if !(capacity.is_finite() && capacity >= 0.0) {
            bail!("topology.default_feeder_capacity_kw must be a finite value >= 0, got {capacity}");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be >= 1");
        }
        self.scheduler.validate().map_err(anyhow::Error::msg)?;
        self.classifier.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::RotationMode;
    use figment::providers::Serialized;

    #[test]
    fn test_empty_figment_uses_defaults() {
        let cfg = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.topology.default_feeder_capacity_kw, 1000.0);
        assert_eq!(cfg.scheduler.history_generations, 7);
        assert_eq!(cfg.scheduler.rotation, RotationMode::Generation);
        assert_eq!(cfg.classifier.high_density.population_above, 10_000);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [server]
            port = 9000

            [scheduler]
            rotation = "hourly"
            day_start_hour = 6
        "#;
        let cfg = Config::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.scheduler.rotation, RotationMode::Hourly);
        assert_eq!(cfg.scheduler.day_start_hour, 6);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_epsilon = Figment::new().merge(Serialized::default("scheduler.epsilon_kw", 0.0));
        assert!(Config::from_figment(bad_epsilon).is_err());

        let bad_history = Figment::new().merge(Serialized::default("scheduler.history_generations", 0));
        assert!(Config::from_figment(bad_history).is_err());

        let bad_day_start = Figment::new().merge(Serialized::default("scheduler.day_start_hour", 24));
        assert!(Config::from_figment(bad_day_start).is_err());

        let bad_capacity = Figment::new().merge(Serialized::default("topology.default_feeder_capacity_kw", -5.0));
        assert!(Config::from_figment(bad_capacity).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
