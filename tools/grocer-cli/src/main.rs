//! Grocer CLI - storefront console for the campus grocer.
//!
//! Commands:
//! - `grocer product` - Manage the catalog
//! - `grocer cart` - Work with this device's cart
//! - `grocer profile` - Register and inspect customer profiles
//! - `grocer order` - Check out and manage orders
//! - `grocer config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CartArgs, ConfigArgs, OrderArgs, ProductArgs, ProfileArgs};

/// Grocer CLI - Browse, order and deliver campus groceries
#[derive(Parser)]
#[command(name = "grocer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Act as this signed-in user
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage catalog products
    Product(ProductArgs),

    /// Add, change and remove cart lines
    Cart(CartArgs),

    /// Manage customer profiles
    Profile(ProfileArgs),

    /// Place, list and complete orders
    Order(OrderArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = match context::Context::load(cli.config.as_deref(), cli.user, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    logging::init(&ctx.config.log, cli.verbose, cli.json)?;
    tracing::debug!(config = ?ctx.config_path, "loaded configuration");

    // Execute command
    let result = match cli.command {
        Commands::Product(args) => commands::product::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Profile(args) => commands::profile::run(args, &ctx).await,
        Commands::Order(args) => commands::order::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
