use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::aggregate::CostAdjustments;
use crate::engine::CostingEngine;
use crate::error::CostingError;
use crate::model::DishSummary;

/// A dish that was left out of the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishFailure {
    pub dish_name: String,
    pub brand: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// In catalog order
    pub dishes: Vec<DishSummary>,
    pub failures: Vec<DishFailure>,
}

/// Cost every dish in scope, at most `summary_concurrency` at a time.
///
/// Each dish is costed in its own brand, so a name shared by several brands
/// gives one row per brand.
///
/// A dish that fails does not fail the summary; it is logged and reported in
/// `failures`. Listing the dishes or an invalid wastage still fails the call.
pub(crate) async fn build_summary(
    engine: &CostingEngine,
    brand: Option<&str>,
    wastage_percent: Option<f64>,
) -> Result<SummaryReport, CostingError> {
    CostAdjustments::from_config(engine.config(), wastage_percent)?;

    let dishes = engine.catalog().list_all_dishes(brand).await?;
    if dishes.is_empty() {
        debug!("No dishes to summarize");
        return Ok(SummaryReport::default());
    }

    let limit = Arc::new(Semaphore::new(engine.config().summary_concurrency.max(1)));
    let scope = brand.map(str::to_string);
    let mut tasks = JoinSet::new();
    let mut pending = HashMap::new();

    for (index, (name, dish_brand)) in dishes.into_iter().enumerate() {
        let engine = engine.clone();
        let limit = Arc::clone(&limit);
        let brand = dish_brand.clone().or_else(|| scope.clone());
        let task_name = name.clone();
        let handle = tasks.spawn(async move {
            let _permit = limit.acquire_owned().await;
            engine
                .dish_cost(&task_name, brand.as_deref(), wastage_percent)
                .await
        });
        pending.insert(handle.id(), (index, name, dish_brand));
    }

    let mut costed = Vec::new();
    let mut failed = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result.map_err(|e| e.to_string())),
            Err(e) => (e.id(), Err(format!("costing task failed: {e}"))),
        };
        let Some((index, name, dish_brand)) = pending.remove(&id) else {
            continue;
        };
        match result {
            Ok(cost) => {
                debug!("Summarized {}", name);
                costed.push((index, DishSummary::from(&cost)));
            }
            Err(reason) => {
                warn!("Skipping {} in summary: {}", name, reason);
                failed.push((
                    index,
                    DishFailure {
                        dish_name: name,
                        brand: dish_brand,
                        reason,
                    },
                ));
            }
        }
    }

    costed.sort_by_key(|(index, _)| *index);
    failed.sort_by_key(|(index, _)| *index);

    Ok(SummaryReport {
        dishes: costed.into_iter().map(|(_, summary)| summary).collect(),
        failures: failed.into_iter().map(|(_, failure)| failure).collect(),
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::catalog::{Catalog, InMemoryCatalog};
    use crate::engine::CostingEngine;
    use crate::error::CostingError;
    use crate::model::{
        Category, ComponentKind, ComponentLine, Ingredient, MainRecipe, SubRecipe, Uom,
    };

    fn line(name: &str, quantity: f64, uom: Uom) -> ComponentLine {
        ComponentLine {
            kind: ComponentKind::Ingredient,
            name: name.to_string(),
            quantity,
            uom,
            category: Category::Food,
        }
    }

    fn dish(name: &str, components: Vec<ComponentLine>) -> MainRecipe {
        MainRecipe {
            name: name.to_string(),
            brand: None,
            servings: 1,
            selling_price: 100.0,
            packaging_charge: 0.0,
            packaging_pushed: 0.0,
            components,
        }
    }

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_ingredient(Ingredient {
            name: "Rice".to_string(),
            brand: None,
            uom: Uom::Kilogram,
            unit_price: Some(10.0),
            yield_percent: 100.0,
        });
        catalog
            .add_main_recipe(dish("Biryani", vec![line("Rice", 500.0, Uom::Gram)]))
            .add_main_recipe(dish("Broken", vec![line("Saffron", 1.0, Uom::Gram)]))
            .add_main_recipe(dish("Plain Rice", vec![line("Rice", 1.0, Uom::Kilogram)]));
        catalog
    }

    #[tokio::test]
    async fn test_summary_skips_failures_and_keeps_order() {
        let engine = CostingEngine::builder()
            .catalog(catalog())
            .wastage_percent(0.0)
            .summary_concurrency(2)
            .build()
            .unwrap();

        let report = engine.summary_report(None, None).await.unwrap();

        let names: Vec<_> = report.dishes.iter().map(|d| d.dish_name.as_str()).collect();
        assert_eq!(names, vec!["Biryani", "Plain Rice"]);
        assert_eq!(report.dishes[0].food_cost, 5.0);
        assert_eq!(report.dishes[1].total_cost, 10.0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].dish_name, "Broken");
    }

    #[tokio::test]
    async fn test_empty_catalog_gives_empty_summary() {
        let engine = CostingEngine::builder()
            .catalog(InMemoryCatalog::new())
            .build()
            .unwrap();
        assert!(engine.summary(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_rejects_negative_wastage() {
        let engine = CostingEngine::builder().catalog(catalog()).build().unwrap();
        assert!(engine.summary(None, Some(-1.0)).await.is_err());
    }

    #[tokio::test]
    async fn test_same_dish_in_two_brands_gives_two_rows() {
        let mut catalog = catalog();
        let mut mashawi = dish("Kabsa", vec![line("Rice", 300.0, Uom::Gram)]);
        mashawi.brand = Some("Al Mashawi".to_string());
        let mut wraps = dish("Kabsa", vec![line("Rice", 200.0, Uom::Gram)]);
        wraps.brand = Some("Wrap Co".to_string());
        catalog.add_main_recipe(mashawi).add_main_recipe(wraps);
        let engine = CostingEngine::builder()
            .catalog(catalog)
            .wastage_percent(0.0)
            .build()
            .unwrap();

        let report = engine.summary_report(None, None).await.unwrap();

        let kabsa: Vec<_> = report
            .dishes
            .iter()
            .filter(|d| d.dish_name == "Kabsa")
            .map(|d| (d.brand.as_deref(), d.food_cost))
            .collect();
        assert_eq!(kabsa, vec![(Some("Al Mashawi"), 3.0), (Some("Wrap Co"), 2.0)]);
        assert_eq!(report.failures.len(), 1);
    }

    /// Delegates to an in-memory catalog but panics on one dish
    struct PanickyCatalog(InMemoryCatalog);

    #[async_trait]
    impl Catalog for PanickyCatalog {
        async fn find_ingredient(
            &self,
            name: &str,
            brand: Option<&str>,
        ) -> Result<Ingredient, CostingError> {
            self.0.find_ingredient(name, brand).await
        }

        async fn find_sub_recipe(
            &self,
            name: &str,
            brand: Option<&str>,
        ) -> Result<SubRecipe, CostingError> {
            self.0.find_sub_recipe(name, brand).await
        }

        async fn find_main_recipe(
            &self,
            name: &str,
            brand: Option<&str>,
        ) -> Result<MainRecipe, CostingError> {
            if name == "Plain Rice" {
                panic!("corrupt record");
            }
            self.0.find_main_recipe(name, brand).await
        }

        async fn list_all_dishes(
            &self,
            brand: Option<&str>,
        ) -> Result<Vec<(String, Option<String>)>, CostingError> {
            self.0.list_all_dishes(brand).await
        }

        async fn list_all_dish_names(
            &self,
            brand: Option<&str>,
        ) -> Result<Vec<String>, CostingError> {
            self.0.list_all_dish_names(brand).await
        }

        async fn list_sub_recipe_names(
            &self,
            brand: Option<&str>,
        ) -> Result<Vec<String>, CostingError> {
            self.0.list_sub_recipe_names(brand).await
        }
    }

    #[tokio::test]
    async fn test_panicking_dish_is_reported_as_failure() {
        let engine = CostingEngine::builder()
            .catalog(PanickyCatalog(catalog()))
            .build()
            .unwrap();

        let report = engine.summary_report(None, Some(0.0)).await.unwrap();

        assert_eq!(report.dishes.len(), 1);
        let failed: Vec<_> = report.failures.iter().map(|f| f.dish_name.as_str()).collect();
        assert_eq!(failed, vec!["Broken", "Plain Rice"]);
        assert!(report.failures[1].reason.contains("costing task failed"));
    }
}
