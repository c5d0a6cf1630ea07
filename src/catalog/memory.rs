use std::path::Path;

use async_trait::async_trait;
use log::debug;

use super::{normalize_name, Catalog, CatalogDocument};
use crate::error::{CostingError, RecordKind};
use crate::model::{Ingredient, MainRecipe, SubRecipe};

#[derive(Debug, Clone)]
struct Entry<T> {
    key: String,
    brand_key: Option<String>,
    record: T,
}

fn keys(name: &str, brand: Option<&str>) -> (String, Option<String>) {
    (normalize_name(name), brand.map(normalize_name))
}

/// Catalog held entirely in memory, typically loaded from a JSON document
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    ingredients: Vec<Entry<Ingredient>>,
    sub_recipes: Vec<Entry<SubRecipe>>,
    main_recipes: Vec<Entry<MainRecipe>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> &mut Self {
        let (key, brand_key) = keys(&ingredient.name, ingredient.brand.as_deref());
        self.ingredients.push(Entry {
            key,
            brand_key,
            record: ingredient,
        });
        self
    }

    pub fn add_sub_recipe(&mut self, sub_recipe: SubRecipe) -> &mut Self {
        let (key, brand_key) = keys(&sub_recipe.name, sub_recipe.brand.as_deref());
        self.sub_recipes.push(Entry {
            key,
            brand_key,
            record: sub_recipe,
        });
        self
    }

    pub fn add_main_recipe(&mut self, recipe: MainRecipe) -> &mut Self {
        let (key, brand_key) = keys(&recipe.name, recipe.brand.as_deref());
        self.main_recipes.push(Entry {
            key,
            brand_key,
            record: recipe,
        });
        self
    }

    /// Build a catalog from an already-parsed document
    pub fn from_document(document: CatalogDocument) -> Result<Self, CostingError> {
        let mut catalog = Self::new();
        for ingredient in document.ingredients()? {
            catalog.add_ingredient(ingredient);
        }
        for sub_recipe in document.sub_recipes()? {
            catalog.add_sub_recipe(sub_recipe);
        }
        for recipe in document.main_recipes()? {
            catalog.add_main_recipe(recipe);
        }
        debug!(
            "Loaded catalog: {} ingredients, {} sub-recipes, {} dishes",
            catalog.ingredients.len(),
            catalog.sub_recipes.len(),
            catalog.main_recipes.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CostingError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CostingError> {
        let body = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&body)
    }
}

fn lookup<'a, T>(
    entries: &'a [Entry<T>],
    kind: RecordKind,
    name: &str,
    brand: Option<&str>,
) -> Result<&'a T, CostingError> {
    let key = normalize_name(name);
    if key.is_empty() {
        return Err(CostingError::not_found(kind, name));
    }
    let candidates: Vec<&Entry<T>> = entries.iter().filter(|e| e.key == key).collect();

    match brand.map(normalize_name) {
        Some(brand_key) => candidates
            .iter()
            .find(|e| e.brand_key.as_deref() == Some(brand_key.as_str()))
            .or_else(|| candidates.iter().find(|e| e.brand_key.is_none()))
            .map(|e| &e.record)
            .ok_or_else(|| CostingError::not_found(kind, name)),
        None => {
            if let Some(global) = candidates.iter().find(|e| e.brand_key.is_none()) {
                return Ok(&global.record);
            }
            let first = candidates
                .first()
                .ok_or_else(|| CostingError::not_found(kind, name))?;
            if candidates.iter().any(|e| e.brand_key != first.brand_key) {
                return Err(CostingError::Ambiguous {
                    kind,
                    name: name.to_string(),
                });
            }
            Ok(&first.record)
        }
    }
}

/// Records visible in a scope, in catalog order.
///
/// With a brand, a brand-scoped record hides a global one of the same name.
/// Without one, every (name, brand) pair is listed once.
fn in_scope<'a, T>(entries: &'a [Entry<T>], brand: Option<&str>) -> Vec<&'a Entry<T>> {
    let brand_key = brand.map(normalize_name);
    let mut visible: Vec<&Entry<T>> = Vec::new();
    for entry in entries {
        match &brand_key {
            Some(b) => {
                let scoped = entry.brand_key.as_ref() == Some(b);
                if !scoped && entry.brand_key.is_some() {
                    continue;
                }
                let overridden = !scoped
                    && entries
                        .iter()
                        .any(|e| e.key == entry.key && e.brand_key.as_ref() == Some(b));
                if !overridden && !visible.iter().any(|v| v.key == entry.key) {
                    visible.push(entry);
                }
            }
            None => {
                if !visible
                    .iter()
                    .any(|v| v.key == entry.key && v.brand_key == entry.brand_key)
                {
                    visible.push(entry);
                }
            }
        }
    }
    visible
}

fn distinct_names<'a, T: 'a>(
    entries: impl IntoIterator<Item = &'a Entry<T>>,
    name_of: impl Fn(&T) -> &str,
) -> Vec<String> {
    let mut seen = Vec::new();
    let mut names = Vec::new();
    for entry in entries {
        if !seen.contains(&entry.key) {
            seen.push(entry.key.clone());
            names.push(name_of(&entry.record).to_string());
        }
    }
    names
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_ingredient(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<Ingredient, CostingError> {
        lookup(&self.ingredients, RecordKind::Ingredient, name, brand).cloned()
    }

    async fn find_sub_recipe(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SubRecipe, CostingError> {
        lookup(&self.sub_recipes, RecordKind::SubRecipe, name, brand).cloned()
    }

    async fn find_main_recipe(
        &self,
        name: &str,
        brand: Option<&str>,
    ) -> Result<MainRecipe, CostingError> {
        lookup(&self.main_recipes, RecordKind::Dish, name, brand).cloned()
    }

    async fn list_all_dishes(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<(String, Option<String>)>, CostingError> {
        Ok(in_scope(&self.main_recipes, brand)
            .into_iter()
            .map(|e| (e.record.name.clone(), e.record.brand.clone()))
            .collect())
    }

    async fn list_all_dish_names(&self, brand: Option<&str>) -> Result<Vec<String>, CostingError> {
        Ok(distinct_names(in_scope(&self.main_recipes, brand), |r| &r.name))
    }

    async fn list_sub_recipe_names(
        &self,
        brand: Option<&str>,
    ) -> Result<Vec<String>, CostingError> {
        Ok(distinct_names(in_scope(&self.sub_recipes, brand), |r| &r.name))
    }
}
