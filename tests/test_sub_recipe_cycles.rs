use recipe_costing::{CostingEngine, CostingError, InMemoryCatalog};

fn engine(json: &str, max_depth: usize) -> CostingEngine {
    CostingEngine::builder()
        .catalog(InMemoryCatalog::from_json_str(json).unwrap())
        .max_depth(max_depth)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_self_referencing_sub_recipe() {
    let engine = engine(
        r#"{
            "subRecipes": [
                { "recipeName": "Mother Sauce", "yieldQuantity": 1000, "items": [
                    { "type": "Sub Recipe", "itemName": "mother sauce", "quantity": 100, "uom": "GM" }
                ] }
            ],
            "mainRecipes": [
                { "recipeName": "Pasta", "items": [
                    { "type": "Sub Recipe", "itemName": "Mother Sauce", "quantity": 80, "uom": "GM" }
                ] }
            ]
        }"#,
        20,
    );

    let err = engine.dish_cost("Pasta", None, None).await.unwrap_err();
    assert!(matches!(err, CostingError::CycleOrDepthExceeded { .. }));
    assert!(err.is_data_integrity());

    let err = engine.sub_recipe_cost("Mother Sauce", None).await.unwrap_err();
    assert!(matches!(err, CostingError::CycleOrDepthExceeded { .. }));
}

#[tokio::test]
async fn test_indirect_cycle_names_chain() {
    let engine = engine(
        r#"{
            "subRecipes": [
                { "recipeName": "Gravy", "yieldQuantity": 1000, "items": [
                    { "type": "SR", "itemName": "Base", "quantity": 100, "uom": "GM" }
                ] },
                { "recipeName": "Base", "yieldQuantity": 1000, "items": [
                    { "type": "SR", "itemName": "Gravy", "quantity": 100, "uom": "GM" }
                ] }
            ],
            "mainRecipes": [
                { "recipeName": "Curry", "items": [
                    { "type": "SR", "itemName": "Gravy", "quantity": 100, "uom": "GM" }
                ] }
            ]
        }"#,
        20,
    );

    match engine.dish_cost("Curry", None, None).await {
        Err(CostingError::CycleOrDepthExceeded { chain, .. }) => {
            assert_eq!(chain, "gravy -> base -> gravy");
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

const NESTED: &str = r#"{
    "ingredients": [{ "itemName": "Stock Bones", "uom": "KG", "netPrice": 100 }],
    "subRecipes": [
        { "recipeName": "Stock", "yieldQuantity": 1000, "items": [
            { "type": "Ingredient", "itemName": "Stock Bones", "quantity": 1000, "uom": "GM" }
        ] },
        { "recipeName": "Reduction", "yieldQuantity": 500, "items": [
            { "type": "Sub Recipe", "itemName": "Stock", "quantity": 1000, "uom": "GM" }
        ] },
        { "recipeName": "Glaze", "yieldQuantity": 100, "items": [
            { "type": "Sub Recipe", "itemName": "Reduction", "quantity": 500, "uom": "GM" }
        ] }
    ],
    "mainRecipes": [
        { "recipeName": "Glazed Ribs", "items": [
            { "type": "Sub Recipe", "itemName": "Glaze", "quantity": 10, "uom": "GM" }
        ] }
    ]
}"#;

#[tokio::test]
async fn test_nesting_within_depth() {
    let engine = engine(NESTED, 3);
    let cost = engine.dish_cost("Glazed Ribs", None, Some(0.0)).await.unwrap();
    // 100 for the whole chain, concentrated into a 100g glaze
    assert_eq!(cost.food_cost, 10.0);
}

#[tokio::test]
async fn test_nesting_beyond_depth() {
    let engine = engine(NESTED, 2);
    let err = engine.dish_cost("Glazed Ribs", None, None).await.unwrap_err();
    assert!(matches!(
        err,
        CostingError::CycleOrDepthExceeded { depth: 2, .. }
    ));
}
