#![allow(clippy::doc_markdown)]
//! `backoffice` CLI - browse the shop's record store through the data grid
//!
//! Usage:
//!   `backoffice list products --search "gift card" --page-size 25`
//!   `backoffice show orders 12`
//!   `backoffice --db ./db.json delete products 4 5 6`

mod output;
mod view;

use anyhow::Context;
use backoffice_client::resource::collections;
use backoffice_client::{HttpRecordStore, RecordStore, ResourceClient};
use backoffice_core::join::presets;
use backoffice_core::{BackofficeConfig, Database, JoinSpec, RecordId};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::output::Format;
use crate::view::ListOptions;

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(author, version, about = "Back-office CLI - browse and manage shop records")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "backoffice.toml", env = "BACKOFFICE_CONFIG")]
    config: PathBuf,

    /// Record store URL (overrides `client.base_url`)
    #[arg(long, global = true, env = "BACKOFFICE_URL")]
    url: Option<String>,

    /// Work on a local database document instead of a server
    #[arg(long, global = true, conflicts_with = "url")]
    db: Option<PathBuf>,

    /// Log verbosity (overrides `logging.level`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Built-in joins a listing can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum JoinPreset {
    /// `category_id` -> `category_name` ("Parent > Child")
    ProductCategory,
    /// `user_id` -> `customer_name`
    OrderCustomer,
    /// `product_id` -> `product_name`
    ItemProduct,
}

impl From<JoinPreset> for JoinSpec {
    fn from(preset: JoinPreset) -> Self {
        match preset {
            JoinPreset::ProductCategory => presets::product_category(),
            JoinPreset::OrderCustomer => presets::order_customer(),
            JoinPreset::ItemProduct => presets::item_product(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of a collection
    List {
        /// Collection name
        collection: String,

        /// Search text matched against every column
        #[arg(short, long)]
        search: Option<String>,

        /// Column filter, `field=value` (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Sort column, `field` or `field:desc`
        #[arg(long)]
        sort: Option<String>,

        /// Page to show (1-based)
        #[arg(short, long)]
        page: Option<usize>,

        /// Rows per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Joins to apply (defaults to the collection's usual joins)
        #[arg(short, long = "join", value_enum)]
        joins: Vec<JoinPreset>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Show one record with its joins and embedded children
    Show {
        /// Collection name
        collection: String,

        /// Record id
        id: String,
    },

    /// Delete records by id
    Delete {
        /// Collection name
        collection: String,

        /// Record ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BackofficeConfig::load_from_path(&cli.config)?;
    if let Some(url) = &cli.url {
        config.client.base_url.clone_from(url);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    config.validate()?;

    init_tracing(&config);

    let store: Arc<dyn RecordStore> = match &cli.db {
        Some(path) => Arc::new(
            Database::open(path, true)
                .with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None => Arc::new(HttpRecordStore::new(&config.client)),
    };
    tracing::debug!(store = store.store_type(), "record store ready");
    let client = ResourceClient::from_arc(store);

    match cli.command {
        Commands::List {
            collection,
            search,
            filters,
            sort,
            page,
            page_size,
            joins,
            format,
        } => {
            let joins = if joins.is_empty() {
                default_joins(&collection)
            } else {
                joins.into_iter().map(JoinSpec::from).collect()
            };
            let records = client.list_with_joins(&collection, &[], &joins).await?;

            let options = ListOptions {
                search,
                filters,
                sort,
                page,
                page_size,
            };
            let grid = view::build_grid(records, &options, &config.grid)?;
            output::print_page(&grid, format)?;
        }
        Commands::Show { collection, id } => {
            let id = RecordId::from(id);
            let record = match collection.as_str() {
                collections::PRODUCTS => client.product(&id).await?,
                collections::ORDERS => client.order(&id).await?,
                _ => client.get(&collection, &id).await?,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Delete { collection, ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::from).collect();
            let deleted = client.bulk_delete(&collection, &ids).await?;
            println!(
                "{} {} record(s) from {}",
                "Deleted".green().bold(),
                deleted,
                collection
            );
        }
    }

    Ok(())
}

fn default_joins(collection: &str) -> Vec<JoinSpec> {
    match collection {
        collections::PRODUCTS => vec![presets::product_category()],
        collections::ORDERS => vec![presets::order_customer()],
        "order_items" => vec![presets::item_product()],
        _ => Vec::new(),
    }
}

fn init_tracing(config: &BackofficeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
