//! Unit-of-measure conversion and ingredient price resolution.
//!
//! Mass prices are stored per 1000 g regardless of whether the item master
//! lists the item in grams or kilograms. Piece prices are per piece.

use crate::error::CostingError;
use crate::model::{Ingredient, Uom};

pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// Quantity expressed in grams; piece quantities pass through unchanged
pub fn to_grams(quantity: f64, uom: Uom) -> f64 {
    match uom {
        Uom::Kilogram => quantity * GRAMS_PER_KILOGRAM,
        Uom::Gram | Uom::Piece => quantity,
    }
}

/// Convert `quantity` from one unit into another.
///
/// Mass units convert through grams. When either side counts pieces the
/// quantity is taken as-is, matching how piece prices are applied.
pub fn convert_quantity(quantity: f64, from: Uom, to: Uom) -> f64 {
    if from.is_piece() || to.is_piece() {
        return quantity;
    }
    to_grams(quantity, from) / to_grams(1.0, to)
}

/// Usable fraction for a yield percentage in (0, 100]
pub fn yield_fraction(item: &str, yield_percent: f64) -> Result<f64, CostingError> {
    if !yield_percent.is_finite() || yield_percent <= 0.0 || yield_percent > 100.0 {
        return Err(CostingError::InvalidYield {
            item: item.to_string(),
            value: yield_percent.to_string(),
        });
    }
    Ok(yield_percent / 100.0)
}

fn unit_price(item: &Ingredient) -> Result<f64, CostingError> {
    match item.unit_price {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(CostingError::InvalidPrice {
            item: item.name.clone(),
        }),
    }
}

/// Cost of `quantity` of an ingredient declared in `uom`, after yield loss
pub fn ingredient_cost(item: &Ingredient, quantity: f64, uom: Uom) -> Result<f64, CostingError> {
    let price = unit_price(item)?;
    let usable = yield_fraction(&item.name, item.yield_percent)?;

    let raw_cost = if item.uom.is_piece() || uom.is_piece() {
        price * quantity
    } else {
        (price / GRAMS_PER_KILOGRAM) * to_grams(quantity, uom)
    };

    Ok(raw_cost / usable)
}

/// Round a currency figure for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onion(yield_percent: f64) -> Ingredient {
        Ingredient {
            name: "Onion".to_string(),
            brand: None,
            uom: Uom::Kilogram,
            unit_price: Some(40.0),
            yield_percent,
        }
    }

    #[test]
    fn test_thousand_grams_costs_unit_price() {
        let cost = ingredient_cost(&onion(100.0), 1000.0, Uom::Gram).unwrap();
        assert_eq!(cost, 40.0);
    }

    #[test]
    fn test_kilogram_line_quantity() {
        let cost = ingredient_cost(&onion(100.0), 0.5, Uom::Kilogram).unwrap();
        assert_eq!(cost, 20.0);
    }

    #[test]
    fn test_half_yield_doubles_cost() {
        let full = ingredient_cost(&onion(100.0), 250.0, Uom::Gram).unwrap();
        let half = ingredient_cost(&onion(50.0), 250.0, Uom::Gram).unwrap();
        assert!((half - 2.0 * full).abs() < 1e-9);
    }

    #[test]
    fn test_onion_example() {
        let cost = ingredient_cost(&onion(90.0), 500.0, Uom::Gram).unwrap();
        assert!((cost - 22.222_222).abs() < 1e-5);
        assert_eq!(round2(cost), 22.22);
    }

    #[test]
    fn test_piece_cost_is_linear() {
        let bun = Ingredient {
            name: "Burger Bun".to_string(),
            brand: None,
            uom: Uom::Piece,
            unit_price: Some(7.5),
            yield_percent: 100.0,
        };
        assert_eq!(ingredient_cost(&bun, 1.0, Uom::Piece).unwrap(), 7.5);
        assert_eq!(ingredient_cost(&bun, 4.0, Uom::Gram).unwrap(), 30.0);
    }

    #[test]
    fn test_piece_line_against_mass_item() {
        let cost = ingredient_cost(&onion(100.0), 3.0, Uom::Piece).unwrap();
        assert_eq!(cost, 120.0);
    }

    #[test]
    fn test_invalid_yield() {
        for bad in [0.0, -10.0, 120.0, f64::NAN] {
            let err = ingredient_cost(&onion(bad), 100.0, Uom::Gram).unwrap_err();
            assert!(matches!(err, CostingError::InvalidYield { ref item, .. } if item == "Onion"));
        }
    }

    #[test]
    fn test_invalid_price() {
        let mut item = onion(100.0);
        item.unit_price = Some(0.0);
        assert!(matches!(
            ingredient_cost(&item, 100.0, Uom::Gram),
            Err(CostingError::InvalidPrice { .. })
        ));
        item.unit_price = None;
        assert!(matches!(
            ingredient_cost(&item, 100.0, Uom::Gram),
            Err(CostingError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_convert_quantity() {
        assert_eq!(convert_quantity(2.0, Uom::Kilogram, Uom::Gram), 2000.0);
        assert_eq!(convert_quantity(250.0, Uom::Gram, Uom::Kilogram), 0.25);
        assert_eq!(convert_quantity(3.0, Uom::Piece, Uom::Gram), 3.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(62.5), 62.5);
        assert_eq!(round2(22.222_222), 22.22);
        assert_eq!(round2(1.005_1), 1.01);
    }
}
