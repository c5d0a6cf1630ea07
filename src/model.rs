use serde::Serialize;

/// Unit of measure for quantities and stored prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Uom {
    #[serde(rename = "GM")]
    Gram,
    #[serde(rename = "KG")]
    Kilogram,
    #[default]
    #[serde(rename = "PC")]
    Piece,
}

impl Uom {
    /// Parse the unit spellings found in item masters and BOM sheets
    pub fn parse(raw: &str) -> Option<Uom> {
        match raw.trim().to_uppercase().as_str() {
            "GM" | "G" | "GMS" | "GRAM" | "GRAMS" => Some(Uom::Gram),
            "KG" | "KGS" | "KILOGRAM" | "KILOGRAMS" => Some(Uom::Kilogram),
            "PC" | "PCS" | "NOS" | "PIECE" | "PIECES" | "EA" => Some(Uom::Piece),
            _ => None,
        }
    }

    pub fn is_piece(self) -> bool {
        self == Uom::Piece
    }
}

/// Which cost bucket a component line feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Category {
    #[default]
    Food,
    Packaging,
}

/// What a component line points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Ingredient,
    SubRecipe,
}

/// Raw ingredient from the item master
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    /// `None` for items shared by every brand
    pub brand: Option<String>,
    pub uom: Uom,
    /// Price per 1000 g for mass items, per piece otherwise
    pub unit_price: Option<f64>,
    /// Usable percentage after trim and prep loss
    pub yield_percent: f64,
}

/// One line of a sub-recipe or dish bill of materials
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentLine {
    pub kind: ComponentKind,
    pub name: String,
    pub quantity: f64,
    pub uom: Uom,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubRecipe {
    pub name: String,
    pub brand: Option<String>,
    /// Output of one batch, expressed in `yield_uom`
    pub yield_quantity: f64,
    pub yield_uom: Uom,
    pub components: Vec<ComponentLine>,
    /// Precomputed figures used only when the sub-recipe has no components
    pub batch_cost: Option<f64>,
    pub cost_per_unit: Option<f64>,
}

/// A sellable dish
#[derive(Debug, Clone, PartialEq)]
pub struct MainRecipe {
    pub name: String,
    pub brand: Option<String>,
    pub servings: u32,
    pub selling_price: f64,
    /// Flat packaging charge per plate, on top of packaging lines
    pub packaging_charge: f64,
    /// Packaging cost recovered from the customer
    pub packaging_pushed: f64,
    pub components: Vec<ComponentLine>,
}

/// A resolved, costed component in a dish breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub item: String,
    pub kind: ComponentKind,
    pub category: Category,
    /// 0 for lines declared on the dish itself
    pub level: usize,
    pub quantity: f64,
    pub uom: Uom,
    /// Cost of one unit of `uom` after yield adjustment
    pub unit_cost: f64,
    pub cost: f64,
    /// False for sub-recipe components shown for display only
    pub counted: bool,
}

/// Per-plate view of a dish cost
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerPlateCost {
    pub food_cost: f64,
    pub food_cost_with_wastage: f64,
    pub packaging_cost: f64,
    pub total_cost: f64,
}

/// Full costing result for one dish
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishCost {
    pub dish_name: String,
    pub brand: Option<String>,
    pub servings: u32,
    pub selling_price: f64,
    pub wastage_percent: f64,
    pub food_cost: f64,
    pub packaging_cost: f64,
    pub wastage_cost: f64,
    pub variance_cost: f64,
    pub total_cost: f64,
    pub per_plate: PerPlateCost,
    pub food_cost_percent: f64,
    pub packaging_pushed: f64,
    pub final_food_cost_percent: f64,
    pub breakdown: Vec<CostLine>,
}

/// One row of the brand-wide summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishSummary {
    pub dish_name: String,
    pub brand: Option<String>,
    pub food_cost: f64,
    pub packaging_cost: f64,
    pub wastage_cost: f64,
    pub total_cost: f64,
}

impl From<&DishCost> for DishSummary {
    fn from(cost: &DishCost) -> Self {
        DishSummary {
            dish_name: cost.dish_name.clone(),
            brand: cost.brand.clone(),
            food_cost: cost.food_cost,
            packaging_cost: cost.packaging_cost,
            wastage_cost: cost.wastage_cost,
            total_cost: cost.total_cost,
        }
    }
}

/// Cost of one sub-recipe batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRecipeCost {
    pub name: String,
    pub batch_cost: f64,
    pub yield_quantity: f64,
    pub yield_unit: Uom,
    pub cost_per_unit: f64,
}
