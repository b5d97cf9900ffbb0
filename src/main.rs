// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { recipe } => commands::validate(&recipe),
        Commands::ConfigureArgs {
            recipe,
            version,
            variants,
            compiler,
            json,
        } => commands::show_configure_args(&recipe, version.as_deref(), &variants, &compiler, json),
        Commands::Patches {
            recipe,
            version,
            variants,
            compiler,
        } => commands::show_patches(&recipe, version.as_deref(), &variants, &compiler),
        Commands::Libs {
            recipe,
            prefix,
            version,
            variants,
            query,
            json,
        } => commands::show_libs(&recipe, &prefix, version.as_deref(), &variants, &query, json),
        Commands::Cook {
            recipe,
            prefix,
            version,
            variants,
            compiler,
            cuda_prefix,
            jobs,
            keep_builddir,
        } => commands::cook(
            &recipe,
            &prefix,
            version.as_deref(),
            &variants,
            &compiler,
            cuda_prefix.as_ref(),
            jobs,
            keep_builddir,
        ),
    }
}
