//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("[store]");
    ctx.output.kv("data_dir", &ctx.data_dir().display().to_string());
    ctx.output.kv("database_file", &ctx.config.store.database_file);

    ctx.output.info("[cart]");
    ctx.output.kv(
        "max_quantity_per_item",
        &ctx.config.cart.max_quantity_per_item.to_string(),
    );
    ctx.output.kv("currency", &ctx.config.cart.currency);

    ctx.output.info("[delivery]");
    ctx.output.kv("default_city", &ctx.config.delivery.default_city);

    ctx.output.info("[log]");
    ctx.output.kv("level", &ctx.config.log.level);
    ctx.output.kv("format", &format!("{:?}", ctx.config.log.format).to_lowercase());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("grocer.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
