//! Mapping from stored catalog rows onto canonical records.
//!
//! Item masters and BOM sheets arrive in several shapes: spreadsheet exports
//! with column headers as keys ("ITEM DESCIPTION", "Food/Packaging", ...),
//! flat one-row-per-component collections, and normalized documents with a
//! nested `items` array. Every field fallback chain is resolved here so the
//! resolver only ever sees [`Ingredient`], [`SubRecipe`] and [`MainRecipe`].

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::normalize_name;
use crate::error::CostingError;
use crate::model::{Category, ComponentKind, ComponentLine, Ingredient, MainRecipe, SubRecipe, Uom};

type Row = Map<String, Value>;

const ITEM_NAME_KEYS: &[&str] = &["itemName", "Item Name", "ITEM NAME", "name"];
const PRICE_KEYS: &[&str] = &[
    "netPrice",
    "Unit Price(for 1000 GM/1 PC)",
    "currentPrice",
    "IF PRICE NOT FOUND IN SEP-DEC USED OLD ITEM MASTER PRICE",
    "oldPrice",
    "price",
];
const YIELD_PERCENT_KEYS: &[&str] = &["yieldPercent", "Yield", "yield", "Yield %"];
const UOM_KEYS: &[&str] = &["uom", "UOM", "unit"];
const BRAND_KEYS: &[&str] = &["brand", "brandName", "Brand"];

const BOM_NAME_KEYS: &[&str] = &["recipeName", "bomName", "BOM NAME", "BOM Name", "name"];
const LINE_NAME_KEYS: &[&str] = &[
    "itemDescription",
    "ITEM DESCIPTION",
    "ITEM DESCRIPTION",
    "Item Description",
    "refId",
    "itemName",
    "name",
];
const LINE_TYPE_KEYS: &[&str] = &["type", "TYPE", "Type"];
const QUANTITY_KEYS: &[&str] = &["quantity", "Quantity", "QUANTITY", "qty"];
const CATEGORY_KEYS: &[&str] = &[
    "category",
    "Food/Packaging",
    "Food Packaging",
    "Food/Packaging ",
    "Food/Packeging",
    "FoodPackaging",
];

const BATCH_YIELD_KEYS: &[&str] = &["yieldQuantity", "yield", "Yield", "batchYield"];
const BATCH_YIELD_UOM_KEYS: &[&str] = &["yieldUom", "yieldUnit", "Yield UOM"];
const BATCH_COST_KEYS: &[&str] = &["batchCost", "totalCost"];
const COST_PER_UNIT_KEYS: &[&str] = &["costPerUnit", "Cost Per Unit"];

const SERVINGS_KEYS: &[&str] = &["servings", "Servings"];
const SELLING_PRICE_KEYS: &[&str] = &["sellingPrice", "Selling Price", "SP"];
const PACKAGING_CHARGE_KEYS: &[&str] = &["packagingCharge", "Packaging Charge"];
const PACKAGING_PUSHED_KEYS: &[&str] = &["packagingPushed", "Packaging Pushed"];

/// A catalog as stored: loosely typed rows, one list per record type
#[derive(Debug, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default, rename = "ingredients", alias = "itemMaster")]
    pub ingredient_rows: Vec<Value>,
    #[serde(default, rename = "subRecipes", alias = "sub_recipes")]
    pub sub_recipe_rows: Vec<Value>,
    #[serde(default, rename = "mainRecipes", alias = "main_recipes", alias = "dishes")]
    pub main_recipe_rows: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn as_row(value: &Value) -> Result<&Row, CostingError> {
    value
        .as_object()
        .ok_or_else(|| CostingError::InvalidRecord(format!("expected an object, got {value}")))
}

/// First key holding a usable value; null and blank strings count as absent
fn field<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| row.get(*k)).find(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn text(row: &Row, keys: &[&str]) -> Option<String> {
    match field(row, keys)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Result<Option<f64>, String> {
    match NumberOrText::deserialize(value) {
        Ok(NumberOrText::Number(n)) => Ok(Some(n)),
        Ok(NumberOrText::Text(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '%' | ',' | '₹'))
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned.parse::<f64>().map(Some).map_err(|_| s)
        }
        Err(_) => Err(value.to_string()),
    }
}

/// Number from the first present key; `Err` carries the raw text
fn number(row: &Row, keys: &[&str]) -> Result<Option<f64>, String> {
    match field(row, keys) {
        Some(value) => parse_number(value),
        None => Ok(None),
    }
}

fn number_or_invalid(row: &Row, keys: &[&str], item: &str) -> Result<Option<f64>, CostingError> {
    number(row, keys).map_err(|raw| {
        CostingError::InvalidRecord(format!("'{raw}' is not a number ({item})"))
    })
}

fn uom(row: &Row, keys: &[&str], item: &str) -> Result<Option<Uom>, CostingError> {
    match text(row, keys) {
        Some(raw) => Uom::parse(&raw).map(Some).ok_or_else(|| CostingError::InvalidUnit {
            item: item.to_string(),
            unit: raw,
        }),
        None => Ok(None),
    }
}

/// First positive price along the fallback chain, else the first price present
fn price(row: &Row, item: &str) -> Result<Option<f64>, CostingError> {
    let mut first = None;
    for key in PRICE_KEYS {
        if let Some(value) = field(row, &[*key]) {
            let parsed = parse_number(value).map_err(|raw| CostingError::InvalidPrice {
                item: format!("{item} ('{raw}')"),
            })?;
            match parsed {
                Some(p) if p > 0.0 => return Ok(Some(p)),
                Some(p) if first.is_none() => first = Some(p),
                _ => {}
            }
        }
    }
    Ok(first)
}

fn row_brand(row: &Row) -> Option<String> {
    text(row, BRAND_KEYS)
}

fn parse_ingredient(value: &Value) -> Result<Ingredient, CostingError> {
    let row = as_row(value)?;
    let name = text(row, ITEM_NAME_KEYS).ok_or_else(|| {
        CostingError::InvalidRecord(format!("item master row without a name: {value}"))
    })?;
    let yield_percent = number(row, YIELD_PERCENT_KEYS)
        .map_err(|raw| CostingError::InvalidYield {
            item: name.clone(),
            value: raw,
        })?
        .unwrap_or(100.0);

    Ok(Ingredient {
        uom: uom(row, UOM_KEYS, &name)?.unwrap_or_default(),
        unit_price: price(row, &name)?,
        brand: row_brand(row),
        yield_percent,
        name,
    })
}

fn parse_kind(row: &Row, name: &str) -> Result<ComponentKind, CostingError> {
    let Some(raw) = text(row, LINE_TYPE_KEYS) else {
        // Sheets prefix sub-recipe references with "SR:"
        return Ok(if normalize_name(name).starts_with("sr:") {
            ComponentKind::SubRecipe
        } else {
            ComponentKind::Ingredient
        });
    };
    let compact: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_uppercase();
    match compact.as_str() {
        "INGREDIENT" | "ITEM" | "RM" => Ok(ComponentKind::Ingredient),
        "SUBRECIPE" | "SR" => Ok(ComponentKind::SubRecipe),
        _ => Err(CostingError::InvalidRecord(format!(
            "unknown component type '{raw}' for {name}"
        ))),
    }
}

fn parse_category(row: &Row, name: &str) -> Result<Category, CostingError> {
    match text(row, CATEGORY_KEYS) {
        None => Ok(Category::Food),
        Some(raw) => match raw.to_uppercase().as_str() {
            "F" | "FOOD" => Ok(Category::Food),
            "P" | "PACKAGING" | "PACKEGING" => Ok(Category::Packaging),
            _ => Err(CostingError::InvalidRecord(format!(
                "unknown category '{raw}' for {name}"
            ))),
        },
    }
}

fn parse_line(row: &Row, owner: &str) -> Result<ComponentLine, CostingError> {
    let name = text(row, LINE_NAME_KEYS).ok_or_else(|| {
        CostingError::InvalidRecord(format!("component without an item name in {owner}"))
    })?;
    Ok(ComponentLine {
        kind: parse_kind(row, &name)?,
        quantity: number_or_invalid(row, QUANTITY_KEYS, &name)?.unwrap_or(0.0),
        uom: uom(row, UOM_KEYS, &name)?.unwrap_or_default(),
        category: parse_category(row, &name)?,
        name,
    })
}

fn nested_items(row: &Row, owner: &str) -> Result<Vec<ComponentLine>, CostingError> {
    let items = row
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    items
        .iter()
        .map(|item| parse_line(as_row(item)?, owner))
        .collect()
}

/// Rows sharing one BOM name (and brand), in first-seen order
struct Group<'a> {
    name: String,
    brand: Option<String>,
    rows: Vec<&'a Row>,
}

fn bom_name(row: &Row) -> Result<String, CostingError> {
    text(row, BOM_NAME_KEYS).ok_or_else(|| {
        CostingError::InvalidRecord(format!(
            "recipe row without a BOM name: {}",
            Value::Object(row.clone())
        ))
    })
}

fn group_rows<'a>(rows: &[&'a Row]) -> Result<Vec<Group<'a>>, CostingError> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    for &row in rows {
        let name = bom_name(row)?;
        let brand = row_brand(row);
        let key = normalize_name(&name);
        let brand_key = brand.as_deref().map(normalize_name);
        let existing = groups.iter_mut().find(|g| {
            normalize_name(&g.name) == key && g.brand.as_deref().map(normalize_name) == brand_key
        });
        match existing {
            Some(group) => group.rows.push(row),
            None => groups.push(Group {
                name,
                brand,
                rows: vec![row],
            }),
        }
    }
    Ok(groups)
}

/// First value any row in the group has for `keys`
fn group_number(group: &Group, keys: &[&str]) -> Result<Option<f64>, CostingError> {
    for row in &group.rows {
        if let Some(n) = number_or_invalid(row, keys, &group.name)? {
            return Ok(Some(n));
        }
    }
    Ok(None)
}

fn batch_yield(parsed: Result<Option<f64>, String>, name: &str) -> Result<f64, CostingError> {
    // A missing yield is left as zero and rejected when the sub-recipe is costed
    parsed
        .map(|y| y.unwrap_or(0.0))
        .map_err(|raw| CostingError::InvalidYield {
            item: name.to_string(),
            value: raw,
        })
}

fn split_rows(values: &[Value]) -> Result<(Vec<&Row>, Vec<&Row>), CostingError> {
    let mut nested = Vec::new();
    let mut flat = Vec::new();
    for value in values {
        let row = as_row(value)?;
        if row.get("items").is_some_and(Value::is_array) {
            nested.push(row);
        } else {
            flat.push(row);
        }
    }
    Ok((nested, flat))
}

fn nested_sub_recipe(row: &Row) -> Result<SubRecipe, CostingError> {
    let name = bom_name(row)?;
    Ok(SubRecipe {
        yield_quantity: batch_yield(number(row, BATCH_YIELD_KEYS), &name)?,
        yield_uom: uom(row, BATCH_YIELD_UOM_KEYS, &name)?.unwrap_or(Uom::Gram),
        components: nested_items(row, &name)?,
        batch_cost: number_or_invalid(row, BATCH_COST_KEYS, &name)?,
        cost_per_unit: number_or_invalid(row, COST_PER_UNIT_KEYS, &name)?,
        brand: row_brand(row),
        name,
    })
}

fn flat_sub_recipe(group: Group) -> Result<SubRecipe, CostingError> {
    // Stored per-line prices are ignored; components are re-costed from the item master
    let components = group
        .rows
        .iter()
        .map(|row| parse_line(row, &group.name))
        .collect::<Result<Vec<_>, _>>()?;
    let mut parsed_yield = Ok(None);
    for row in &group.rows {
        parsed_yield = number(row, BATCH_YIELD_KEYS);
        if !matches!(parsed_yield, Ok(None)) {
            break;
        }
    }
    let yield_quantity = batch_yield(parsed_yield, &group.name)?;
    let mut yield_uom = None;
    for row in &group.rows {
        if let Some(u) = uom(row, BATCH_YIELD_UOM_KEYS, &group.name)? {
            yield_uom = Some(u);
            break;
        }
    }
    Ok(SubRecipe {
        name: group.name,
        brand: group.brand,
        yield_quantity,
        yield_uom: yield_uom.unwrap_or(Uom::Gram),
        components,
        batch_cost: None,
        cost_per_unit: None,
    })
}

fn servings(value: Option<f64>) -> u32 {
    match value {
        Some(n) if n >= 1.0 => n.round() as u32,
        _ => 1,
    }
}

fn nested_main_recipe(row: &Row) -> Result<MainRecipe, CostingError> {
    let name = bom_name(row)?;
    Ok(MainRecipe {
        servings: servings(number_or_invalid(row, SERVINGS_KEYS, &name)?),
        selling_price: number_or_invalid(row, SELLING_PRICE_KEYS, &name)?.unwrap_or(0.0),
        packaging_charge: number_or_invalid(row, PACKAGING_CHARGE_KEYS, &name)?.unwrap_or(0.0),
        packaging_pushed: number_or_invalid(row, PACKAGING_PUSHED_KEYS, &name)?.unwrap_or(0.0),
        components: nested_items(row, &name)?,
        brand: row_brand(row),
        name,
    })
}

fn flat_main_recipe(group: Group) -> Result<MainRecipe, CostingError> {
    let components = group
        .rows
        .iter()
        .map(|row| parse_line(row, &group.name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MainRecipe {
        servings: servings(group_number(&group, SERVINGS_KEYS)?),
        selling_price: group_number(&group, SELLING_PRICE_KEYS)?.unwrap_or(0.0),
        packaging_charge: group_number(&group, PACKAGING_CHARGE_KEYS)?.unwrap_or(0.0),
        packaging_pushed: group_number(&group, PACKAGING_PUSHED_KEYS)?.unwrap_or(0.0),
        components,
        name: group.name,
        brand: group.brand,
    })
}

impl CatalogDocument {
    pub fn ingredients(&self) -> Result<Vec<Ingredient>, CostingError> {
        self.ingredient_rows.iter().map(parse_ingredient).collect()
    }

    pub fn sub_recipes(&self) -> Result<Vec<SubRecipe>, CostingError> {
        let (nested, flat) = split_rows(&self.sub_recipe_rows)?;
        let mut records = nested
            .into_iter()
            .map(nested_sub_recipe)
            .collect::<Result<Vec<_>, _>>()?;
        for group in group_rows(&flat)? {
            records.push(flat_sub_recipe(group)?);
        }
        debug!("Mapped {} sub-recipes", records.len());
        Ok(records)
    }

    pub fn main_recipes(&self) -> Result<Vec<MainRecipe>, CostingError> {
        let (nested, flat) = split_rows(&self.main_recipe_rows)?;
        let mut records = nested
            .into_iter()
            .map(nested_main_recipe)
            .collect::<Result<Vec<_>, _>>()?;
        for group in group_rows(&flat)? {
            records.push(flat_main_recipe(group)?);
        }
        debug!("Mapped {} dishes", records.len());
        Ok(records)
    }
}
