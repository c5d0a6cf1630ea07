use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::CostingError;

/// Costing engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CostingConfig {
    /// Wastage / production tax uplift applied to food cost, in percent
    /// (5.0 means food cost × 1.05)
    #[serde(default = "default_wastage_percent")]
    pub wastage_percent: f64,
    /// Further uplift applied on top of the wastage-adjusted food cost, in percent
    #[serde(default)]
    pub production_variance_percent: f64,
    /// Maximum sub-recipe nesting before expansion is aborted
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Show sub-recipe components in the breakdown (display only)
    #[serde(default)]
    pub expand_sub_recipes_in_breakdown: bool,
    /// Number of dishes costed concurrently by the summary builder
    #[serde(default = "default_summary_concurrency")]
    pub summary_concurrency: usize,
    /// JSON catalog document used by the CLI
    #[serde(default)]
    pub catalog_path: Option<String>,
    /// Brand scope used when a call does not name one
    #[serde(default)]
    pub default_brand: Option<String>,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            wastage_percent: default_wastage_percent(),
            production_variance_percent: 0.0,
            max_depth: default_max_depth(),
            expand_sub_recipes_in_breakdown: false,
            summary_concurrency: default_summary_concurrency(),
            catalog_path: None,
            default_brand: None,
        }
    }
}

// Default value functions
fn default_wastage_percent() -> f64 {
    5.0
}

fn default_max_depth() -> usize {
    20
}

fn default_summary_concurrency() -> usize {
    4
}

impl CostingConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with COSTING__ prefix
    /// 2. costing.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: COSTING__WASTAGE_PERCENT
    pub fn load() -> Result<Self, CostingError> {
        let config = load_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject percentages and bounds that would make every calculation wrong
    pub fn validate(&self) -> Result<(), CostingError> {
        check_percent(self.wastage_percent)?;
        check_percent(self.production_variance_percent)?;
        if self.max_depth == 0 {
            return Err(CostingError::BuilderError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.summary_concurrency == 0 {
            return Err(CostingError::BuilderError(
                "summary_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_percent(value: f64) -> Result<f64, CostingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CostingError::InvalidWastage(value));
    }
    Ok(value)
}

fn environment() -> Environment {
    // Use double underscore for nested keys
    Environment::with_prefix("COSTING")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration without validating it
pub fn load_config() -> Result<CostingConfig, ConfigError> {
    load_config_from(environment())
}

fn load_config_from(environment: Environment) -> Result<CostingConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("costing").required(false))
        .add_source(environment)
        .build()?;

    settings.try_deserialize()
}
