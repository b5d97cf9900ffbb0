// src/cli.rs

//! CLI definitions
//!
//! Command implementations live in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mason")]
#[command(version)]
#[command(about = "Build scientific libraries from declarative recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a recipe file
    Validate {
        /// Path to the recipe TOML file
        recipe: PathBuf,
    },

    /// Show the configure arguments for a selection
    ConfigureArgs {
        /// Path to the recipe TOML file
        recipe: PathBuf,

        /// Release version (default: highest numbered release)
        #[arg(short, long)]
        version: Option<String>,

        /// Variant overrides, e.g. "+cuda ~shared cuda_arch=70"
        #[arg(long, default_value = "")]
        variants: String,

        /// Compiler identity
        #[arg(long, default_value = "gcc")]
        compiler: String,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Show the patches that apply to a selection
    Patches {
        /// Path to the recipe TOML file
        recipe: PathBuf,

        /// Release version (default: highest numbered release)
        #[arg(short, long)]
        version: Option<String>,

        /// Variant overrides, e.g. "+cuda ~shared"
        #[arg(long, default_value = "")]
        variants: String,

        /// Compiler identity
        #[arg(long, default_value = "gcc")]
        compiler: String,
    },

    /// Locate installed libraries under a prefix
    Libs {
        /// Path to the recipe TOML file
        recipe: PathBuf,

        /// Installation prefix to search
        prefix: PathBuf,

        /// Release version (default: highest numbered release)
        #[arg(short, long)]
        version: Option<String>,

        /// Variant overrides, e.g. "~shared"
        #[arg(long, default_value = "")]
        variants: String,

        /// Query parameters, e.g. "static" or "fortran"
        #[arg(short, long)]
        query: Vec<String>,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Fetch, patch, configure, compile, and install a recipe
    Cook {
        /// Path to the recipe TOML file
        recipe: PathBuf,

        /// Installation prefix
        prefix: PathBuf,

        /// Release version (default: highest numbered release)
        #[arg(short, long)]
        version: Option<String>,

        /// Variant overrides, e.g. "+cuda ~shared cuda_arch=70"
        #[arg(long, default_value = "")]
        variants: String,

        /// Compiler identity
        #[arg(long, default_value = "gcc")]
        compiler: String,

        /// CUDA toolkit prefix (required with +cuda)
        #[arg(long)]
        cuda_prefix: Option<PathBuf>,

        /// Number of parallel compile jobs
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Keep the build directory after completion
        #[arg(long)]
        keep_builddir: bool,
    },
}
