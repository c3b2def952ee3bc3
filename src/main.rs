//! # Delivery Query CLI (`dq`)
//!
//! ## Usage
//!
//! ```bash
//! dq --config ./config/dq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dq fields` | Print the index schema built from the registered handlers |
//! | `dq index` | Load content and build the index, reporting document counts |
//! | `dq query` | Run a content query and print the page of keys as JSON |
//! | `dq serve` | Start the HTTP delivery server |
//!
//! ## Examples
//!
//! ```bash
//! dq query --fetch children:5b9c1c4e-0000-0000-0000-000000000001 \
//!     --filter contentType:article --sort createDate:desc --take 5
//!
//! RUST_LOG=delivery_query=debug,delivery_query_core=debug dq serve
//! ```

use clap::{Parser, Subcommand};
use delivery_query::config;
use delivery_query::delivery::{builtin_index_handlers, Delivery, DeliveryRequest};
use delivery_query::server;
use delivery_query_core::index::indexer::ContentIndexer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Delivery Query CLI: query published content through pluggable
/// selectors, filters and sorts.
#[derive(Parser)]
#[command(name = "dq", version, about = "Delivery Query: content queries over a content index")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the index schema.
    ///
    /// Honors `index.strict_fields`: with strict fields a collision between
    /// two handlers is reported as an error.
    Fields,

    /// Build the index from the configured content file.
    Index {
        /// Print every index document as JSON.
        #[arg(long)]
        dump: bool,
    },

    /// Run a content query.
    Query {
        /// Selector fragment, e.g. `children:{key}`.
        #[arg(long)]
        fetch: Option<String>,

        /// Filter fragment, e.g. `contentType:article`. Repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Sort fragment, e.g. `name:asc`. Repeatable.
        #[arg(long = "sort")]
        sorts: Vec<String>,

        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Page size (defaults to `delivery.default_page_size`).
        #[arg(long)]
        take: Option<usize>,

        /// Culture to query (defaults to `delivery.default_culture`).
        #[arg(long)]
        culture: Option<String>,
    },

    /// Start the HTTP delivery server.
    Serve,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("delivery_query=info,delivery_query_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Fields => {
            let indexer = ContentIndexer::new(Arc::new(builtin_index_handlers()));
            let fields = indexer.build_schema(cfg.index.strict_fields)?;
            println!("{:<16} {:<16} VARIES", "FIELD", "TYPE");
            for field in fields {
                println!(
                    "{:<16} {:<16} {}",
                    field.field_name,
                    format!("{:?}", field.field_type),
                    if field.varies_by_culture { "yes" } else { "no" }
                );
            }
        }
        Commands::Index { dump } => {
            let (items, tree) = delivery_query::content::load_content(&cfg.content.path)?;
            let delivery = Delivery::from_content(&cfg, &items, tree).await?;

            if dump {
                let documents: Vec<_> = items
                    .iter()
                    .flat_map(|c| delivery.indexer().documents(c))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                println!(
                    "Indexed {} content items as {} documents ({} fields).",
                    items.len(),
                    delivery.document_count(),
                    delivery.schema().len()
                );
            }
        }
        Commands::Query {
            fetch,
            filters,
            sorts,
            skip,
            take,
            culture,
        } => {
            let delivery = Delivery::load(&cfg).await?;
            let request = DeliveryRequest {
                fetch,
                filters,
                sorts,
                skip,
                take,
                culture,
            };
            let page = delivery.execute(&request).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
