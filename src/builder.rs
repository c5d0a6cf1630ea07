use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::CostingConfig;
use crate::engine::CostingEngine;
use crate::error::CostingError;

/// Builder for configuring a [`CostingEngine`]
///
/// Values set on the builder override the ones in [`CostingConfig`].
#[derive(Default)]
pub struct CostingEngineBuilder {
    catalog: Option<Arc<dyn Catalog>>,
    config: Option<CostingConfig>,
    wastage_percent: Option<f64>,
    production_variance_percent: Option<f64>,
    max_depth: Option<usize>,
    expand_sub_recipes: Option<bool>,
    summary_concurrency: Option<usize>,
    default_brand: Option<String>,
}

impl CostingEngineBuilder {
    /// Set the catalog the engine reads from
    pub fn catalog(mut self, catalog: impl Catalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Use a catalog that is already shared elsewhere
    pub fn shared_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Start from a loaded configuration instead of the defaults
    ///
    /// # Example
    /// ```
    /// use recipe_costing::{CostingConfig, CostingEngine, InMemoryCatalog};
    ///
    /// let config = CostingConfig {
    ///     wastage_percent: 12.0,
    ///     production_variance_percent: 5.0,
    ///     ..Default::default()
    /// };
    /// let engine = CostingEngine::builder()
    ///     .catalog(InMemoryCatalog::new())
    ///     .config(config)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(engine.config().production_variance_percent, 5.0);
    /// ```
    pub fn config(mut self, config: CostingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Wastage / production tax uplift on food cost, in percent
    pub fn wastage_percent(mut self, percent: f64) -> Self {
        self.wastage_percent = Some(percent);
        self
    }

    /// Extra uplift applied after wastage, in percent
    pub fn production_variance_percent(mut self, percent: f64) -> Self {
        self.production_variance_percent = Some(percent);
        self
    }

    /// Maximum sub-recipe nesting
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Show sub-recipe components in breakdowns. Totals are unaffected.
    pub fn expand_sub_recipes(mut self, expand: bool) -> Self {
        self.expand_sub_recipes = Some(expand);
        self
    }

    /// Number of dishes the summary costs at once
    pub fn summary_concurrency(mut self, limit: usize) -> Self {
        self.summary_concurrency = Some(limit);
        self
    }

    /// Brand used when a call does not pass one
    pub fn default_brand(mut self, brand: impl Into<String>) -> Self {
        self.default_brand = Some(brand.into());
        self
    }

    /// Validate the settings and create the engine
    ///
    /// # Errors
    /// Returns `CostingError` if no catalog was set or a setting is out of range
    pub fn build(self) -> Result<CostingEngine, CostingError> {
        let catalog = self.catalog.ok_or_else(|| {
            CostingError::BuilderError("No catalog specified. Use .catalog()".to_string())
        })?;

        let mut config = self.config.unwrap_or_default();
        if let Some(percent) = self.wastage_percent {
            config.wastage_percent = percent;
        }
        if let Some(percent) = self.production_variance_percent {
            config.production_variance_percent = percent;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(expand) = self.expand_sub_recipes {
            config.expand_sub_recipes_in_breakdown = expand;
        }
        if let Some(limit) = self.summary_concurrency {
            config.summary_concurrency = limit;
        }
        if self.default_brand.is_some() {
            config.default_brand = self.default_brand;
        }
        config.validate()?;

        Ok(CostingEngine::new(catalog, config))
    }
}
