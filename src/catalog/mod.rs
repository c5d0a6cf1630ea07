mod memory;
pub mod records;

pub use memory::InMemoryCatalog;
pub use records::CatalogDocument;

use async_trait::async_trait;

use crate::error::CostingError;
use crate::model::{Ingredient, MainRecipe, SubRecipe};

/// Read-only access to ingredient, sub-recipe and dish master data.
///
/// Lookups match on [`normalize_name`] equality only; partial or pattern
/// matches are never attempted. A `brand` of `None` prefers the global
/// record and fails with `Ambiguous` when only several brands match.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_ingredient(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<Ingredient, CostingError>;

    async fn find_sub_recipe(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SubRecipe, CostingError>;

    async fn find_main_recipe(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<MainRecipe, CostingError>;

    /// Every dish in scope as (name, brand), in catalog order. A name that
    /// exists in several brands appears once per brand.
    async fn list_all_dishes(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<(String, Option<String>)>, CostingError>;

    /// Distinct dish names in scope, in catalog order
    async fn list_all_dish_names(&self, brand: Option<&str>) -> Result<Vec<String>, CostingError>;

    /// Names of every sub-recipe in scope, in catalog order
    async fn list_sub_recipe_names(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<String>, CostingError>;
}

/// Trim, collapse inner whitespace and case-fold a catalog name
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
