use std::sync::Arc;

use log::info;

use crate::aggregate::{aggregate, CostAdjustments};
use crate::builder::CostingEngineBuilder;
use crate::catalog::Catalog;
use crate::config::CostingConfig;
use crate::error::CostingError;
use crate::model::{DishCost, DishSummary, SubRecipeCost};
use crate::resolver::CostResolver;
use crate::summary::{build_summary, SummaryReport};

/// Costs dishes against a catalog. Cheap to clone; clones share the catalog.
#[derive(Clone)]
pub struct CostingEngine {
    catalog: Arc<dyn Catalog>,
    config: CostingConfig,
}

impl CostingEngine {
    /// Creates a new builder for a costing engine
    ///
    /// # Example
    /// ```
    /// use recipe_costing::{CostingEngine, InMemoryCatalog};
    ///
    /// let engine = CostingEngine::builder()
    ///     .catalog(InMemoryCatalog::new())
    ///     .wastage_percent(12.0)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(engine.config().wastage_percent, 12.0);
    /// ```
    pub fn builder() -> CostingEngineBuilder {
        CostingEngineBuilder::default()
    }

    pub(crate) fn new(catalog: Arc<dyn Catalog>, config: CostingConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &CostingConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    fn resolver(&self) -> CostResolver {
        CostResolver::new(
            Arc::clone(&self.catalog),
            self.config.max_depth,
            self.config.expand_sub_recipes_in_breakdown,
        )
    }

    fn scope<'a>(&'a self, brand: Option<&'a str>) -> Option<&'a str> {
        brand.or(self.config.default_brand.as_deref())
    }

    /// Cost one dish with its breakdown
    ///
    /// # Errors
    /// Returns `CostingError` if the dish or any component cannot be
    /// resolved, a yield or price is invalid, sub-recipes nest too deeply,
    /// or `wastage_percent` is negative. No partial result is produced.
    pub async fn dish_cost(
        &self,
        dish_name: &str,
        brand: Option<&str>,
        wastage_percent: Option<f64>,
    ) -> Result<DishCost, CostingError> {
        let adjustments = CostAdjustments::from_config(&self.config, wastage_percent)?;
        let scope = self.scope(brand);
        let dish = self.catalog.find_main_recipe(dish_name, scope).await?;
        let breakdown = self.resolver().resolve_dish(&dish, scope).await?;
        let cost = aggregate(&dish, breakdown, &adjustments);
        info!(
            "Costed {}: food {} packaging {} total {}",
            cost.dish_name, cost.food_cost, cost.packaging_cost, cost.total_cost
        );
        Ok(cost)
    }

    /// Summary rows for every dish in scope; failed dishes are left out
    pub async fn summary(
        &self,
        brand: Option<&str>,
        wastage_percent: Option<f64>,
    ) -> Result<Vec<DishSummary>, CostingError> {
        Ok(self.summary_report(brand, wastage_percent).await?.dishes)
    }

    /// Summary rows plus the dishes that could not be costed and why
    pub async fn summary_report(
        &self,
        brand: Option<&str>,
        wastage_percent: Option<f64>,
    ) -> Result<SummaryReport, CostingError> {
        build_summary(self, self.scope(brand), wastage_percent).await
    }

    /// Batch cost and cost per yield unit of one sub-recipe
    pub async fn sub_recipe_cost(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SubRecipeCost, CostingError> {
        let scope = self.scope(brand);
        let sub_recipe = self.catalog.find_sub_recipe(name, scope).await?;
        let scope = sub_recipe.brand.as_deref().or(scope);
        self.resolver().sub_recipe_cost(&sub_recipe, scope).await
    }

    /// Dish names in scope, alphabetically
    pub async fn list_dishes(&self, brand: Option<&str>) -> Result<Vec<String>, CostingError> {
        let mut names = self.catalog.list_all_dish_names(self.scope(brand)).await?;
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }

    /// Sub-recipe names in scope, alphabetically
    pub async fn list_sub_recipes(&self, brand: Option<&str>) -> Result<Vec<String>, CostingError> {
        let mut names = self
            .catalog
            .list_sub_recipe_names(self.scope(brand))
            .await?;
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }
}
