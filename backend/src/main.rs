//! Storemap CLI - store-location dashboards from CSV
//!
//! ```bash
//! storemap serve                          # Start HTTP server (port 3000)
//! storemap selectors overall              # List the states with stores
//! storemap view overall --select CA       # Page view as JSON
//! storemap counts classifier              # Grouped counts as JSON
//! ```
//!
//! Source paths come from `.env` / `STOREMAP_*` variables; the global flags
//! below override them.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use storemap::{
    build_view, category_fallbacks, find_page, page_counts, selector_domain, AppConfig,
    CountOrder, DataStore, ServerError, SourceCache,
};

type CliResult = Result<(), ServerError>;

#[derive(Parser)]
#[command(name = "storemap")]
#[command(about = "Filter and aggregate store-location CSVs for map dashboards", long_about = None)]
struct Cli {
    /// Store table CSV
    #[arg(long, global = true)]
    stores: Option<PathBuf>,

    /// County-clustering CSV
    #[arg(long, global = true)]
    clusters: Option<PathBuf>,

    /// Read at most this many data rows per source
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the tables once and start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the selector domain of a page
    Selectors {
        /// Page slug (overall, classifier)
        page: String,
    },

    /// Print a page view as JSON
    View {
        /// Page slug (overall, classifier)
        page: String,

        /// Selector value (default: first in the domain)
        #[arg(short, long)]
        select: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print grouped counts of a page's table as JSON
    Counts {
        /// Page slug (overall, classifier)
        page: String,

        /// Column to group by (default: the page's category column)
        #[arg(short, long)]
        column: Option<String>,

        /// Keep first-occurrence order instead of sorting
        #[arg(long)]
        first_seen: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.stores {
        config.stores_csv = path;
    }
    if let Some(path) = cli.clusters {
        config.clusters_csv = path;
    }
    if let Some(max_rows) = cli.max_rows {
        config.max_rows = max_rows;
    }

    let store = DataStore::open(&config, &SourceCache::new())?;
    category_fallbacks(&store);

    match cli.command {
        Commands::Serve { port } => {
            storemap::server::start_server(store, port.unwrap_or(config.port)).await
        }
        Commands::Selectors { page } => cmd_selectors(&store, &page),
        Commands::View {
            page,
            select,
            output,
        } => cmd_view(&store, &page, select.as_deref(), output.as_deref()),
        Commands::Counts {
            page,
            column,
            first_seen,
        } => cmd_counts(&store, &page, column.as_deref(), first_seen),
    }
}

fn cmd_selectors(store: &DataStore, slug: &str) -> CliResult {
    let page = find_page(slug)?;
    for value in selector_domain(store, page) {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_view(
    store: &DataStore,
    slug: &str,
    select: Option<&str>,
    output: Option<&Path>,
) -> CliResult {
    let page = find_page(slug)?;
    let view = build_view(store, page, select, CountOrder::Lexical);

    eprintln!(
        "{}: {} of {} rows",
        page.title,
        view.rows.len(),
        view.total_rows
    );

    let json = serde_json::to_string_pretty(&view)?;
    write_output(&json, output)
}

fn cmd_counts(
    store: &DataStore,
    slug: &str,
    column: Option<&str>,
    first_seen: bool,
) -> CliResult {
    let page = find_page(slug)?;
    let order = if first_seen {
        CountOrder::FirstSeen
    } else {
        CountOrder::Lexical
    };

    let counts = page_counts(store, page, column, order)?;
    let json = serde_json::to_string_pretty(&counts)?;
    write_output(&json, None)
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
