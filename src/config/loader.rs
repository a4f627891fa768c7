use crate::config::schedule::ScheduleConfig;
use crate::config::sources::SourcesConfig;
use crate::config::token::SyntheticTokenConfig;
use crate::config::*;
use crate::error::{Error, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub synthetic_token: SyntheticTokenConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layers `config/default`, `config/<env>` and `TOKENFEED__*` variables.
    pub fn load(env: &str) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("TOKENFEED").separator("__"));

        Self::build(builder)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.synthetic_token.address.trim().is_empty() {
            return Err(Error::ConfigError("synthetic_token.address is empty".to_string()));
        }

        let at = self.schedule.token_list_daily_at;
        if at.hour > 23 || at.minute > 59 {
            return Err(Error::ConfigError(format!(
                "schedule.token_list_daily_at out of range: {:02}:{:02}",
                at.hour, at.minute
            )));
        }

        if self.schedule.market_prices_every_secs == 0
            || self.schedule.reference_price_every_secs == 0
        {
            return Err(Error::ConfigError("refresh intervals must be non-zero".to_string()));
        }

        if self.sources.request_timeout_secs == 0 {
            return Err(Error::ConfigError("sources.request_timeout_secs must be non-zero".to_string()));
        }

        Ok(())
    }
}
