use std::env;

use log::debug;
use serde::Serialize;

use recipe_costing::{CostingConfig, CostingEngine, InMemoryCatalog};

const USAGE: &str = "Usage: recipe-costing [--catalog FILE] [--brand B] [--wastage P] [--expand] \
<dish NAME | summary | sub-recipe NAME | dishes>";

#[derive(Debug, Default)]
struct Args {
    catalog: Option<String>,
    brand: Option<String>,
    wastage: Option<f64>,
    expand: bool,
    help: bool,
    command: Vec<String>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, Box<dyn std::error::Error>> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--catalog" => args.catalog = Some(raw.next().ok_or("--catalog needs a file")?),
            "--brand" => args.brand = Some(raw.next().ok_or("--brand needs a value")?),
            "--wastage" => {
                let value = raw.next().ok_or("--wastage needs a percentage")?;
                args.wastage = Some(value.parse()?);
            }
            "--expand" => args.expand = true,
            "-h" | "--help" => args.help = true,
            flag if flag.starts_with('-') => return Err(format!("Unknown option '{flag}'").into()),
            _ => args.command.push(arg),
        }
    }
    Ok(args)
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = parse_args(env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = CostingConfig::load()?;

    let catalog_path = args
        .catalog
        .clone()
        .or_else(|| config.catalog_path.clone())
        .ok_or("Please provide a catalog with --catalog or COSTING__CATALOG_PATH")?;
    debug!("Loading catalog from {}", catalog_path);
    let catalog = InMemoryCatalog::from_json_file(&catalog_path).await?;

    let mut builder = CostingEngine::builder().catalog(catalog).config(config);
    if args.expand {
        builder = builder.expand_sub_recipes(true);
    }
    let engine = builder.build()?;
    let brand = args.brand.as_deref();

    match args.command.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["dish", name @ ..] if !name.is_empty() => {
            print_json(&engine.dish_cost(&name.join(" "), brand, args.wastage).await?)
        }
        ["sub-recipe", name @ ..] if !name.is_empty() => {
            print_json(&engine.sub_recipe_cost(&name.join(" "), brand).await?)
        }
        ["summary"] => print_json(&engine.summary_report(brand, args.wastage).await?),
        ["dishes"] => print_json(&engine.list_dishes(brand).await?),
        _ => {
            eprintln!("{USAGE}");
            Err(format!("Unknown command '{}'", args.command.join(" ")).into())
        }
    }
}
