//! Food Explorer CLI - browse the Open Food Facts catalog and manage the cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse the default listing
//! food-cli browse
//!
//! # Search, sorted by Nutri-Score, two pages
//! food-cli browse --query muesli --sort nutrition-asc --pages 2
//!
//! # Filter by category
//! food-cli browse --category "Breakfast cereals"
//!
//! # Look up a barcode, or show its full details
//! food-cli barcode 3017620422003
//! food-cli show 3017620422003
//!
//! # Manage the cart
//! food-cli cart add 3017620422003
//! food-cli cart set 3017620422003 3
//! food-cli cart list
//! ```
//!
//! # Commands
//!
//! - `browse` - List products by query, category or default browse
//! - `barcode` - Look up a single product by code
//! - `show` - Show full details of a product
//! - `categories` - List filter categories
//! - `cart` - Inspect and modify the persisted cart

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use food_explorer::config::ExplorerConfig;
use food_explorer::error::AppError;
use food_explorer::state::AppState;
use food_explorer_core::SortKey;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "food-cli")]
#[command(author, version, about = "Browse Open Food Facts and keep a shopping cart")]
struct Cli {
    /// Cart snapshot file (overrides `FOOD_EXPLORER_CART_PATH`)
    #[arg(long, global = true)]
    cart: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products by query, category or the default browse
    Browse {
        /// Free-text search
        #[arg(short, long)]
        query: Option<String>,

        /// Category filter (takes precedence over --query)
        #[arg(short, long)]
        category: Option<String>,

        /// Sort key (`name-asc`, `name-desc`, `nutrition-asc`, `nutrition-desc`)
        #[arg(short, long, default_value_t = SortKey::NameAsc)]
        sort: SortKey,

        /// Number of pages to accumulate
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Look up a product by barcode
    Barcode {
        /// Product code
        code: String,
    },
    /// Show full details of a product
    Show {
        /// Product code
        code: String,
    },
    /// List filter categories
    Categories {
        /// List the whole directory instead of the filter options
        #[arg(long)]
        all: bool,
    },
    /// Inspect and modify the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart items
    List,
    /// Add one of a product, looked up by code
    Add {
        /// Product code
        code: String,
    },
    /// Set the quantity of a product (0 or less removes it)
    Set {
        /// Product code
        code: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Remove a product
    Remove {
        /// Product code
        code: String,
    },
    /// Remove every product
    Clear,
    /// Print the total item count
    Count,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ExplorerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let mut config = match ExplorerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", AppError::from(e).user_message());
            std::process::exit(2);
        }
    };
    if let Some(path) = cli.cart.clone() {
        config.cart_path = path;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "food_explorer=info,food_explorer_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ExplorerConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Browse {
            query,
            category,
            sort,
            pages,
        } => commands::browse::run(&state, query, category, sort, pages).await?,
        Commands::Barcode { code } => commands::product::lookup(&state, code).await?,
        Commands::Show { code } => commands::product::show(&state, &code).await?,
        Commands::Categories { all } => commands::categories::run(&state, all).await?,
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&state),
            CartAction::Add { code } => commands::cart::add(&state, &code).await?,
            CartAction::Set { code, count } => commands::cart::set(&state, &code, count)?,
            CartAction::Remove { code } => commands::cart::remove(&state, &code)?,
            CartAction::Clear => commands::cart::clear(&state)?,
            CartAction::Count => commands::cart::count(&state),
        },
    }
    Ok(())
}
