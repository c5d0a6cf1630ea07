use std::sync::Arc;

use recipe_costing::{compute_all_dishes_summary, CostingEngine, InMemoryCatalog};

const CATALOG: &str = r#"{
    "ingredients": [
        { "itemName": "Paneer", "uom": "KG", "netPrice": 400 },
        { "itemName": "Butter", "uom": "KG", "netPrice": 500 },
        { "itemName": "Tandoori Roti", "uom": "PC", "netPrice": 6 },
        { "itemName": "Foil Tray", "uom": "PC", "netPrice": 4 }
    ],
    "subRecipes": [
        { "recipeName": "Makhani Gravy", "yieldQuantity": 1000, "items": [
            { "type": "Ingredient", "itemName": "Butter", "quantity": 200, "uom": "GM" },
            { "type": "Sub Recipe", "itemName": "Tikka Base", "quantity": 100, "uom": "GM" }
        ] },
        { "recipeName": "Tikka Base", "yieldQuantity": 500, "items": [
            { "type": "Sub Recipe", "itemName": "Makhani Gravy", "quantity": 50, "uom": "GM" }
        ] }
    ],
    "mainRecipes": [
        { "recipeName": "Paneer Tikka", "sellingPrice": 280, "items": [
            { "itemName": "Paneer", "quantity": 250, "uom": "GM" },
            { "itemName": "Foil Tray", "quantity": 1, "uom": "PC", "category": "Packaging" }
        ] },
        { "recipeName": "Paneer Makhani", "sellingPrice": 320, "items": [
            { "itemName": "Paneer", "quantity": 200, "uom": "GM" },
            { "type": "Sub Recipe", "itemName": "Makhani Gravy", "quantity": 150, "uom": "GM" }
        ] },
        { "recipeName": "Butter Roti", "sellingPrice": 40, "items": [
            { "itemName": "Tandoori Roti", "quantity": 1, "uom": "PC" },
            { "itemName": "Butter", "quantity": 10, "uom": "GM" }
        ] }
    ]
}"#;

fn engine() -> CostingEngine {
    CostingEngine::builder()
        .catalog(InMemoryCatalog::from_json_str(CATALOG).unwrap())
        .wastage_percent(10.0)
        .summary_concurrency(3)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_summary_isolates_failing_dish() {
    let report = engine().summary_report(None, None).await.unwrap();

    let names: Vec<_> = report.dishes.iter().map(|d| d.dish_name.as_str()).collect();
    assert_eq!(names, vec!["Paneer Tikka", "Butter Roti"]);

    let tikka = &report.dishes[0];
    assert_eq!(tikka.food_cost, 100.0);
    assert_eq!(tikka.wastage_cost, 10.0);
    assert_eq!(tikka.packaging_cost, 4.0);
    assert_eq!(tikka.total_cost, 114.0);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].dish_name, "Paneer Makhani");
    assert!(report.failures[0].reason.contains("Makhani Gravy"));
}

#[tokio::test]
async fn test_summary_matches_single_dish_costs() {
    let engine = engine();
    let summary = engine.summary(None, Some(0.0)).await.unwrap();

    for row in &summary {
        let cost = engine.dish_cost(&row.dish_name, None, Some(0.0)).await.unwrap();
        assert_eq!(row.total_cost, cost.total_cost);
        assert_eq!(row.food_cost, cost.food_cost);
    }
    assert_eq!(summary[1].food_cost, 11.0);
}

#[tokio::test]
async fn test_summary_convenience_function() {
    let catalog = Arc::new(InMemoryCatalog::from_json_str(CATALOG).unwrap());
    let summary = compute_all_dishes_summary(catalog, None, Some(0.0))
        .await
        .unwrap();
    assert_eq!(summary.len(), 2);
}

#[tokio::test]
async fn test_empty_catalog_summary() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let summary = compute_all_dishes_summary(catalog, None, None).await.unwrap();
    assert!(summary.is_empty());
}

#[tokio::test]
async fn test_list_dishes_sorted() {
    let dishes = engine().list_dishes(None).await.unwrap();
    assert_eq!(dishes, vec!["Butter Roti", "Paneer Makhani", "Paneer Tikka"]);

    let sub_recipes = engine().list_sub_recipes(None).await.unwrap();
    assert_eq!(sub_recipes, vec!["Makhani Gravy", "Tikka Base"]);
}

const MULTI_BRAND: &str = r#"{
    "ingredients": [
        { "itemName": "Chicken", "uom": "KG", "netPrice": 300 },
        { "itemName": "Chickpeas", "uom": "KG", "netPrice": 100 }
    ],
    "mainRecipes": [
        { "recipeName": "Shawarma", "brand": "Al Mashawi", "items": [
            { "itemName": "Chicken", "quantity": 150, "uom": "GM" }
        ] },
        { "recipeName": "Shawarma", "brand": "Wrap Co", "items": [
            { "itemName": "Chicken", "quantity": 100, "uom": "GM" }
        ] },
        { "recipeName": "Falafel", "brand": "Wrap Co", "items": [
            { "itemName": "Chickpeas", "quantity": 30, "uom": "GM" }
        ] }
    ]
}"#;

#[tokio::test]
async fn test_unscoped_summary_costs_every_brand() {
    let engine = CostingEngine::builder()
        .catalog(InMemoryCatalog::from_json_str(MULTI_BRAND).unwrap())
        .build()
        .unwrap();

    let report = engine.summary_report(None, Some(0.0)).await.unwrap();

    let rows: Vec<_> = report
        .dishes
        .iter()
        .map(|d| (d.dish_name.as_str(), d.brand.as_deref(), d.food_cost))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Shawarma", Some("Al Mashawi"), 45.0),
            ("Shawarma", Some("Wrap Co"), 30.0),
            ("Falafel", Some("Wrap Co"), 3.0),
        ]
    );
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_default_brand_scopes_summary() {
    let engine = CostingEngine::builder()
        .catalog(InMemoryCatalog::from_json_str(MULTI_BRAND).unwrap())
        .default_brand("wrap co")
        .build()
        .unwrap();

    let summary = engine.summary(None, Some(0.0)).await.unwrap();
    let names: Vec<_> = summary.iter().map(|d| d.dish_name.as_str()).collect();
    assert_eq!(names, vec!["Shawarma", "Falafel"]);
    assert_eq!(summary[0].food_cost, 30.0);

    let explicit = engine.summary(Some("Al Mashawi"), Some(0.0)).await.unwrap();
    assert_eq!(explicit.len(), 1);
    assert_eq!(explicit[0].food_cost, 45.0);
}
