use recipe_costing::{CostingEngine, InMemoryCatalog};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/catalog.json");
    let catalog = InMemoryCatalog::from_json_file(path).await?;

    let engine = CostingEngine::builder()
        .catalog(catalog)
        .wastage_percent(5.0)
        .expand_sub_recipes(true)
        .build()?;

    for name in engine.list_dishes(None).await? {
        let cost = engine.dish_cost(&name, None, None).await?;
        println!(
            "{:<28} food {:>8.2}  packaging {:>6.2}  per plate {:>8.2}  ({:.2}% of {:.2})",
            cost.dish_name,
            cost.food_cost,
            cost.packaging_cost,
            cost.per_plate.total_cost,
            cost.food_cost_percent,
            cost.selling_price
        );
        for line in &cost.breakdown {
            let marker = if line.counted { "" } else { " (shown only)" };
            println!(
                "{:indent$}- {} {} {:?}: {:.2}{}",
                "",
                line.item,
                line.quantity,
                line.uom,
                line.cost,
                marker,
                indent = 2 + line.level * 2
            );
        }
    }

    let sauce = engine.sub_recipe_cost("Garlic Sauce", None).await?;
    println!("\n{}", serde_json::to_string_pretty(&sauce)?);

    Ok(())
}
