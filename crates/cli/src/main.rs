//! Avira Vastra CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Check the backend
//! av-cli health --watch
//!
//! # Browse and fill the bag
//! av-cli products list --occasion wedding
//! av-cli cart add 64f1c2 --quantity 2
//!
//! # Sign in and check out
//! av-cli account login -e meera@example.in -p secret
//! av-cli checkout --street "12 MG Road" --city Pune --pincode 411001 --cancel
//!
//! # Back-office
//! av-cli admin login -e admin@aviravastra.in -p secret
//! av-cli admin orders --status placed
//! ```
//!
//! # Commands
//!
//! - `health` - Probe the backend once or watch it
//! - `products` - Browse the catalog and taxonomies
//! - `cart` - Inspect and change the persisted bag
//! - `account` - Sign in, register, profile
//! - `orders` - Order history, tracking, confirmation
//! - `checkout` - Place an order for the bag
//! - `admin` - Back-office operations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use avira_vastra_storefront::AppState;
use avira_vastra_storefront::config::StorefrontConfig;

mod commands;

use commands::{CliError, CommandResult};

#[derive(Parser)]
#[command(name = "av-cli")]
#[command(author, version, about = "Avira Vastra storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe backend health
    Health {
        /// Keep polling and print every status change
        #[arg(short, long)]
        watch: bool,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: commands::products::ProductsAction,
    },
    /// Manage the shopping bag
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Customer account
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Orders and tracking
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Check out the current bag
    Checkout(commands::checkout::CheckoutArgs),
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "avira_vastra_storefront=info,avira_vastra_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> CommandResult {
    let state = AppState::new(config).map_err(CliError::from)?;

    match cli.command {
        Commands::Health { watch } => commands::health::run(&state, watch).await,
        Commands::Products { action } => commands::products::run(&state, action).await,
        Commands::Cart { action } => commands::cart::run(&state, action).await,
        Commands::Account { action } => commands::account::run(&state, action).await,
        Commands::Orders { action } => commands::orders::run(&state, action).await,
        Commands::Checkout(args) => commands::checkout::run(&state, args).await,
        Commands::Admin { action } => commands::admin::run(&state, action).await,
    }
}
