use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Config structure with the processor's key knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Admission knobs for the consumption loop. Both values are fixed at
/// construction time and never change for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_report_interval")]
    pub report_interval: u32,
    #[serde(default = "default_message_ceiling")]
    pub message_ceiling: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            report_interval: default_report_interval(),
            message_ceiling: default_message_ceiling(),
        }
    }
}

fn default_report_interval() -> u32 {
    10
}

fn default_message_ceiling() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_listen_addr")]
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_metrics_listen_addr(),
        }
    }
}

fn default_metrics_listen_addr() -> String {
    "127.0.0.1:9090".to_string()
}

/// Size of the demo feed's trailing burst of single-sale notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_extra_messages")]
    pub extra_messages: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            extra_messages: default_extra_messages(),
        }
    }
}

fn default_extra_messages() -> u32 {
    50
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.report_interval == 0 {
            return Err(ConfigError::Message(
                "ingest.report_interval must be positive".to_string(),
            ));
        }
        if self.ingest.message_ceiling == 0 {
            return Err(ConfigError::Message(
                "ingest.message_ceiling must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
