use crate::config::{check_percent, CostingConfig};
use crate::error::CostingError;
use crate::model::{Category, CostLine, DishCost, MainRecipe, PerPlateCost};
use crate::units::round2;

/// Uplifts applied to raw food cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostAdjustments {
    /// 5.0 means food cost × 1.05
    pub wastage_percent: f64,
    /// Applied on top of the wastage-adjusted food cost
    pub production_variance_percent: f64,
}

impl CostAdjustments {
    pub fn new(wastage_percent: f64, production_variance_percent: f64) -> Result<Self, CostingError> {
        Ok(Self {
            wastage_percent: check_percent(wastage_percent)?,
            production_variance_percent: check_percent(production_variance_percent)?,
        })
    }

    /// Configured adjustments, with an optional per-request wastage override
    pub fn from_config(
        config: &CostingConfig,
        wastage_override: Option<f64>,
    ) -> Result<Self, CostingError> {
        Self::new(
            wastage_override.unwrap_or(config.wastage_percent),
            config.production_variance_percent,
        )
    }
}

impl Default for CostAdjustments {
    fn default() -> Self {
        let config = CostingConfig::default();
        Self {
            wastage_percent: config.wastage_percent,
            production_variance_percent: config.production_variance_percent,
        }
    }
}

/// Sum of counted line costs per bucket, unrounded
pub fn category_totals(lines: &[CostLine]) -> (f64, f64) {
    lines
        .iter()
        .filter(|l| l.counted)
        .fold((0.0, 0.0), |(food, packaging), l| match l.category {
            Category::Food => (food + l.cost, packaging),
            Category::Packaging => (food, packaging + l.cost),
        })
}

fn percent_of(value: f64, selling_price: f64) -> f64 {
    if selling_price.is_finite() && selling_price > 0.0 {
        value / selling_price * 100.0
    } else {
        0.0
    }
}

/// Reduce resolved lines into the dish's cost figures.
///
/// Food figures are divided by servings for the per-plate view; packaging is
/// already per plate. Rounding happens here and nowhere earlier.
pub fn aggregate(
    dish: &MainRecipe,
    breakdown: Vec<CostLine>,
    adjustments: &CostAdjustments,
) -> DishCost {
    let (food_cost, packaging_lines) = category_totals(&breakdown);
    let packaging_cost = packaging_lines + dish.packaging_charge;

    let wastage_cost = food_cost * adjustments.wastage_percent / 100.0;
    let variance_cost =
        (food_cost + wastage_cost) * adjustments.production_variance_percent / 100.0;
    let adjusted_food = food_cost + wastage_cost + variance_cost;
    let total_cost = adjusted_food + packaging_cost;

    let servings = f64::from(dish.servings.max(1));
    let plate_food = food_cost / servings;
    let plate_adjusted_food = adjusted_food / servings;
    let plate_total = plate_adjusted_food + packaging_cost;

    DishCost {
        dish_name: dish.name.clone(),
        brand: dish.brand.clone(),
        servings: dish.servings.max(1),
        selling_price: round2(dish.selling_price),
        wastage_percent: adjustments.wastage_percent,
        food_cost: round2(food_cost),
        packaging_cost: round2(packaging_cost),
        wastage_cost: round2(wastage_cost),
        variance_cost: round2(variance_cost),
        total_cost: round2(total_cost),
        per_plate: PerPlateCost {
            food_cost: round2(plate_food),
            food_cost_with_wastage: round2(plate_adjusted_food),
            packaging_cost: round2(packaging_cost),
            total_cost: round2(plate_total),
        },
        food_cost_percent: round2(percent_of(plate_total, dish.selling_price)),
        packaging_pushed: round2(dish.packaging_pushed),
        final_food_cost_percent: round2(percent_of(
            plate_total - dish.packaging_pushed,
            dish.selling_price,
        )),
        breakdown,
    }
}
