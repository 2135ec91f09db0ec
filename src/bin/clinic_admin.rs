//! Administrator front end for the clinic catalog.
//!
//! Each invocation checks the credential pair, loads the document, runs one
//! command, and saves when the command changed anything. Read-only commands
//! print JSON on stdout; logs go to stderr.

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use clinic_catalog::{
    CatalogDocument, CatalogStore, ProductDraft, UNIT_OPTIONS, add_product, add_source,
    authenticate, delete_product, ensure_categories, init_tracing, list_categories, products,
    resolve_data_path, sample_document, update_product,
};
use std::path::PathBuf;
use tracing::info;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "clinic-admin")]
#[command(about = "Manage clinic products, sources and categories")]
struct Cli {
    /// Data file (defaults to $CLINIC_DATA_FILE, then ./clinic_data.json).
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    user: String,
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fixed categories with product counts.
    Categories,
    /// Print the products of one category.
    List { category: String },
    /// Register a new product source.
    AddSource { name: String },
    /// Append a product to a category.
    Add {
        category: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Replace the product at INDEX, keeping its id and date added.
    Update {
        category: String,
        index: usize,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Remove the product at INDEX.
    Delete { category: String, index: usize },
    /// Rewrite legacy name-keyed categories into the list shape.
    Migrate,
    /// Add empty lists for any fixed category that has none.
    SeedCategories,
    /// Replace the whole document with the demonstration catalog.
    ResetSample,
}

#[derive(Args, Debug)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    source: String,
    #[arg(long, allow_negative_numbers = true)]
    price: f64,
    #[arg(long, default_value = UNIT_OPTIONS[0])]
    unit: String,
    /// Mark as a parallel import instead of genuine goods.
    #[arg(long)]
    parallel: bool,
}

impl From<ProductFields> for ProductDraft {
    fn from(fields: ProductFields) -> Self {
        ProductDraft {
            name: fields.name,
            source: fields.source,
            is_genuine: !fields.parallel,
            price: fields.price,
            unit: fields.unit,
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = CatalogStore::new(resolve_data_path(cli.data));
    let mut doc = store.load();

    let Some(session) = authenticate(&doc, &cli.user, &cli.password) else {
        bail!("Invalid username or password");
    };
    info!(user = %session.username, role = ?session.role, "authenticated");

    let changed = execute(cli.command, &mut doc)?;
    if changed {
        store
            .save(&doc)
            .with_context(|| format!("saving {}", store.path().display()))?;
    }
    Ok(())
}

/// Runs `command` against `doc`; returns whether the document must be saved.
fn execute(command: Command, doc: &mut CatalogDocument) -> Result<bool> {
    match command {
        Command::Categories => {
            println!("{}", serde_json::to_string_pretty(&list_categories(doc))?);
            Ok(false)
        }
        Command::List { category } => {
            println!("{}", serde_json::to_string_pretty(products(doc, &category))?);
            Ok(false)
        }
        Command::AddSource { name } => {
            add_source(doc, &name)?;
            Ok(true)
        }
        Command::Add { category, fields } => {
            let now = Local::now().naive_local();
            let product = add_product(doc, &category, fields.into(), now)?;
            println!("{}", serde_json::to_string_pretty(product)?);
            Ok(true)
        }
        Command::Update {
            category,
            index,
            fields,
        } => {
            let product = update_product(doc, &category, index, fields.into())?;
            println!("{}", serde_json::to_string_pretty(product)?);
            Ok(true)
        }
        Command::Delete { category, index } => {
            let removed = delete_product(doc, &category, index)?;
            println!("{}", serde_json::to_string_pretty(&removed)?);
            Ok(true)
        }
        // load() already migrated; saving persists the canonical shape.
        Command::Migrate => Ok(true),
        Command::SeedCategories => {
            let added = ensure_categories(doc);
            eprintln!("added {added} categories");
            Ok(added > 0)
        }
        Command::ResetSample => {
            *doc = sample_document();
            Ok(true)
        }
    }
}
