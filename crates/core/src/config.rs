use serde::Deserialize;

use crate::error::CampaignResult;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_WIZARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
}

/// Thresholds used by the step validation rules.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,
    /// Campaigns shorter than this only get an advisory warning.
    #[serde(default = "default_recommended_min_campaign_days")]
    pub recommended_min_campaign_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// Upper bound on the best-effort draft save performed by `close()`.
    #[serde(default = "default_close_save_timeout_ms")]
    pub close_save_timeout_ms: u64,
}

// Default functions
fn default_min_description_chars() -> usize {
    10
}
fn default_recommended_min_campaign_days() -> i64 {
    14
}
fn default_close_save_timeout_ms() -> u64 {
    5000
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_description_chars: default_min_description_chars(),
            recommended_min_campaign_days: default_recommended_min_campaign_days(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            close_save_timeout_ms: default_close_save_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> CampaignResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_WIZARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
