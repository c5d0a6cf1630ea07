pub mod aggregate;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod resolver;
pub mod summary;
pub mod units;

use std::sync::Arc;

pub use builder::CostingEngineBuilder;
pub use catalog::{Catalog, CatalogDocument, InMemoryCatalog};
pub use config::CostingConfig;
pub use engine::CostingEngine;
pub use error::{CostingError, RecordKind};
pub use model::{
    CostLine, DishCost, DishSummary, Ingredient, MainRecipe, PerPlateCost, SubRecipe,
    SubRecipeCost, Uom,
};
pub use summary::{DishFailure, SummaryReport};

/// Cost a single dish against a catalog with default settings
///
/// # Example
/// ```no_run
/// # async fn run() -> Result<(), recipe_costing::CostingError> {
/// use std::sync::Arc;
/// use recipe_costing::{compute_dish_cost, InMemoryCatalog};
///
/// let catalog = Arc::new(InMemoryCatalog::from_json_file("catalog.json").await?);
/// let cost = compute_dish_cost(catalog, "Chicken Shawarma", None, Some(5.0)).await?;
/// println!("{}", cost.per_plate.total_cost);
/// # Ok(())
/// # }
/// ```
pub async fn compute_dish_cost(
    catalog: Arc<dyn Catalog>,
    dish_name: &str,
    brand: Option<&str>,
    wastage_percent: Option<f64>,
) -> Result<DishCost, CostingError> {
    CostingEngine::builder()
        .shared_catalog(catalog)
        .build()?
        .dish_cost(dish_name, brand, wastage_percent)
        .await
}

/// Summary rows for every dish in the catalog, skipping dishes that fail
pub async fn compute_all_dishes_summary(
    catalog: Arc<dyn Catalog>,
    brand: Option<&str>,
    wastage_percent: Option<f64>,
) -> Result<Vec<DishSummary>, CostingError> {
    CostingEngine::builder()
        .shared_catalog(catalog)
        .build()?
        .summary(brand, wastage_percent)
        .await
}
