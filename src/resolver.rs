//! Recursive bill-of-materials expansion.
//!
//! Sub-recipes are costed as a single line: the batch cost of their own
//! components divided by the batch yield, times the quantity the parent uses.
//! With breakdown expansion enabled the sub-recipe's components are appended
//! beneath it, scaled to the quantity used and marked as not counted, so the
//! totals never change with the display setting.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::debug;

use crate::catalog::{normalize_name, Catalog};
use crate::error::CostingError;
use crate::model::{
    ComponentKind, ComponentLine, CostLine, MainRecipe, SubRecipe, SubRecipeCost, Uom,
};
use crate::units::{convert_quantity, ingredient_cost};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Costed sub-recipe batch with its component lines (levels relative to the batch)
#[derive(Debug, Clone)]
struct Batch {
    batch_cost: f64,
    cost_per_unit: f64,
    yield_quantity: f64,
    yield_uom: Uom,
    lines: Vec<CostLine>,
}

#[derive(Clone)]
pub struct CostResolver {
    catalog: Arc<dyn Catalog>,
    max_depth: usize,
    expand_sub_recipes: bool,
}

impl CostResolver {
    pub fn new(catalog: Arc<dyn Catalog>, max_depth: usize, expand_sub_recipes: bool) -> Self {
        Self {
            catalog,
            max_depth,
            expand_sub_recipes,
        }
    }

    /// Flatten a dish into costed lines. Any failing component aborts the dish.
    ///
    /// Components are looked up in the dish's own brand, falling back to `brand`
    /// for dishes stored without one.
    pub async fn resolve_dish(
        &self,
        dish: &MainRecipe,
        brand: Option<&str>,
    ) -> Result<Vec<CostLine>, CostingError> {
        let brand = dish.brand.as_deref().or(brand);
        let mut lines = Vec::with_capacity(dish.components.len());
        for component in &dish.components {
            self.resolve_line(component, brand, &[], &mut lines).await?;
        }
        debug!("Resolved {} into {} lines", dish.name, lines.len());
        Ok(lines)
    }

    /// Batch cost and cost per yield unit of one sub-recipe
    pub async fn sub_recipe_cost(
        &self,
        sub_recipe: &SubRecipe,
        brand: Option<&str>,
    ) -> Result<SubRecipeCost, CostingError> {
        let batch = self.cost_batch(sub_recipe, brand, &[]).await?;
        Ok(SubRecipeCost {
            name: sub_recipe.name.clone(),
            batch_cost: batch.batch_cost,
            yield_quantity: batch.yield_quantity,
            yield_unit: batch.yield_uom,
            cost_per_unit: batch.cost_per_unit,
        })
    }

    async fn resolve_line(
        &self,
        line: &ComponentLine,
        brand: Option<&str>,
        path: &[String],
        out: &mut Vec<CostLine>,
    ) -> Result<(), CostingError> {
        match line.kind {
            ComponentKind::Ingredient => {
                let item = self.catalog.find_ingredient(&line.name, brand).await?;
                let cost = ingredient_cost(&item, line.quantity, line.uom)?;
                let unit_cost = ingredient_cost(&item, 1.0, line.uom)?;
                debug!("{} x {} {:?} = {}", item.name, line.quantity, line.uom, cost);
                out.push(CostLine {
                    item: item.name,
                    kind: ComponentKind::Ingredient,
                    category: line.category,
                    level: 0,
                    quantity: line.quantity,
                    uom: line.uom,
                    unit_cost,
                    cost,
                    counted: true,
                });
            }
            ComponentKind::SubRecipe => {
                let sub_recipe = self.catalog.find_sub_recipe(&line.name, brand).await?;
                let batch = self.cost_batch(&sub_recipe, brand, path).await?;
                let used = convert_quantity(line.quantity, line.uom, batch.yield_uom);
                let cost = batch.cost_per_unit * used;
                debug!(
                    "{} x {} {:?} = {} ({} per {:?})",
                    sub_recipe.name, line.quantity, line.uom, cost, batch.cost_per_unit, batch.yield_uom
                );
                out.push(CostLine {
                    item: sub_recipe.name,
                    kind: ComponentKind::SubRecipe,
                    category: line.category,
                    level: 0,
                    quantity: line.quantity,
                    uom: line.uom,
                    unit_cost: batch.cost_per_unit
                        * convert_quantity(1.0, line.uom, batch.yield_uom),
                    cost,
                    counted: true,
                });
                if self.expand_sub_recipes && !batch.lines.is_empty() {
                    let share = used / batch.yield_quantity;
                    out.extend(batch.lines.into_iter().map(|child| CostLine {
                        category: line.category,
                        level: child.level + 1,
                        quantity: child.quantity * share,
                        cost: child.cost * share,
                        counted: false,
                        ..child
                    }));
                }
            }
        }
        Ok(())
    }

    fn cost_batch<'a>(
        &'a self,
        sub_recipe: &'a SubRecipe,
        brand: Option<&'a str>,
        path: &'a [String],
    ) -> BoxFuture<'a, Result<Batch, CostingError>> {
        Box::pin(async move {
            let key = normalize_name(&sub_recipe.name);
            if path.contains(&key) || path.len() >= self.max_depth {
                let mut chain = path.to_vec();
                chain.push(key);
                return Err(CostingError::CycleOrDepthExceeded {
                    item: sub_recipe.name.clone(),
                    depth: path.len(),
                    chain: chain.join(" -> "),
                });
            }

            let yield_quantity = sub_recipe.yield_quantity;
            let valid_yield = yield_quantity.is_finite() && yield_quantity > 0.0;
            let invalid_yield = || CostingError::InvalidYield {
                item: sub_recipe.name.clone(),
                value: yield_quantity.to_string(),
            };

            if sub_recipe.components.is_empty() {
                let cost_per_unit = match (sub_recipe.cost_per_unit, sub_recipe.batch_cost) {
                    (Some(per_unit), _) if per_unit.is_finite() && per_unit > 0.0 => per_unit,
                    (_, Some(batch)) if batch.is_finite() && batch > 0.0 => {
                        if !valid_yield {
                            return Err(invalid_yield());
                        }
                        batch / yield_quantity
                    }
                    _ => {
                        return Err(CostingError::InvalidPrice {
                            item: sub_recipe.name.clone(),
                        })
                    }
                };
                return Ok(Batch {
                    batch_cost: sub_recipe
                        .batch_cost
                        .unwrap_or(cost_per_unit * yield_quantity),
                    cost_per_unit,
                    yield_quantity,
                    yield_uom: sub_recipe.yield_uom,
                    lines: Vec::new(),
                });
            }

            if !valid_yield {
                return Err(invalid_yield());
            }

            let mut inner_path = path.to_vec();
            inner_path.push(key);

            let mut lines = Vec::with_capacity(sub_recipe.components.len());
            for component in &sub_recipe.components {
                self.resolve_line(component, brand, &inner_path, &mut lines)
                    .await?;
            }
            let batch_cost: f64 = lines.iter().filter(|l| l.counted).map(|l| l.cost).sum();

            Ok(Batch {
                batch_cost,
                cost_per_unit: batch_cost / yield_quantity,
                yield_quantity,
                yield_uom: sub_recipe.yield_uom,
                lines,
            })
        })
    }
}
