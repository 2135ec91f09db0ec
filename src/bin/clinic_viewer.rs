//! Read-only catalog viewer.
//!
//! Without `--category` prints every fixed category with its product count;
//! with it prints that category's rows. Never writes the data file.

use anyhow::Result;
use clap::Parser;
use clinic_catalog::{CatalogStore, init_tracing, list_categories, resolve_data_path, viewer_rows};
use std::path::PathBuf;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "clinic-viewer")]
#[command(about = "Browse the clinic product catalog")]
struct Cli {
    /// Data file (defaults to $CLINIC_DATA_FILE, then ./clinic_data.json).
    #[arg(long)]
    data: Option<PathBuf>,
    /// Show the products of this category.
    #[arg(long)]
    category: Option<String>,
    /// Emit JSON instead of a text table.
    #[arg(long)]
    json: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let doc = CatalogStore::new(resolve_data_path(cli.data)).load();

    let Some(category) = cli.category else {
        let summaries = list_categories(&doc);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            for summary in summaries {
                println!("{}\t{}", summary.name, summary.count);
            }
        }
        return Ok(());
    };

    let rows = viewer_rows(&doc, &category);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No products in {category}.");
    } else {
        println!("Product Name\tPrice\tType\tSource");
        for row in rows {
            println!("{}\t{}\t{}\t{}", row.name, row.price, row.kind, row.source);
        }
    }
    Ok(())
}
