// src/commands.rs

//! Command implementations for the mason CLI

use anyhow::{Context, Result};
use mason::{
    applicable_patches, configure_args, parse_recipe_file, toolkit_exists, validate_conflicts,
    validate_recipe, Compiler, CudaToolkit, Kitchen, KitchenConfig, Recipe, Selection,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn load_recipe(path: &Path) -> Result<Recipe> {
    let recipe = parse_recipe_file(path)
        .with_context(|| format!("failed to load recipe {}", path.display()))?;
    Ok(recipe)
}

fn build_selection(
    recipe: &Recipe,
    version: Option<&str>,
    variants: &str,
    compiler: &str,
) -> Result<Selection> {
    let version = match version {
        Some(v) => v.to_string(),
        None => recipe.preferred_version()?.as_str().to_string(),
    };

    let mut selection = Selection::from_recipe(recipe, &version, Compiler::new(compiler))?;
    if !variants.is_empty() {
        selection.apply_spec(recipe, variants)?;
    }
    Ok(selection)
}

pub fn validate(recipe_path: &Path) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let warnings = validate_recipe(&recipe)?;

    for warning in &warnings {
        warn!("{}", warning);
    }
    println!(
        "{}: {} releases, {} variants, {} conflicts, {} patches ({} warnings)",
        recipe.package.name,
        recipe.releases.len(),
        recipe.variants.len(),
        recipe.conflicts.len(),
        recipe.patches.len(),
        warnings.len()
    );
    Ok(())
}

pub fn show_configure_args(
    recipe_path: &Path,
    version: Option<&str>,
    variants: &str,
    compiler: &str,
    json: bool,
) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let selection = build_selection(&recipe, version, variants, compiler)?;
    validate_conflicts(&recipe, &selection)?;

    let args = configure_args(&recipe, &selection);
    if json {
        println!("{}", serde_json::to_string_pretty(&args)?);
    } else {
        for arg in args {
            println!("{}", arg);
        }
    }
    Ok(())
}

pub fn show_patches(
    recipe_path: &Path,
    version: Option<&str>,
    variants: &str,
    compiler: &str,
) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let selection = build_selection(&recipe, version, variants, compiler)?;

    let patches = applicable_patches(&recipe, &selection)?;
    if patches.is_empty() {
        println!("no patches apply to {}", selection);
    } else {
        for patch in patches {
            println!("{}", patch.file);
        }
    }
    Ok(())
}

pub fn show_libs(
    recipe_path: &Path,
    prefix: &Path,
    version: Option<&str>,
    variants: &str,
    query: &[String],
    json: bool,
) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let selection = build_selection(&recipe, version, variants, "gcc")?;

    let query: Vec<&str> = query.iter().map(|s| s.as_str()).collect();
    let found = mason::libs(&recipe, &selection, prefix, &query)?;

    if json {
        let paths: Vec<String> = found
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        for path in found {
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cook(
    recipe_path: &Path,
    prefix: &Path,
    version: Option<&str>,
    variants: &str,
    compiler: &str,
    cuda_prefix: Option<&PathBuf>,
    jobs: Option<u32>,
    keep_builddir: bool,
) -> Result<()> {
    let recipe = load_recipe(recipe_path)?;
    let warnings = validate_recipe(&recipe)?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let selection = build_selection(&recipe, version, variants, compiler)?;

    let mut config = KitchenConfig {
        keep_builddir,
        // Patch files resolve relative to the recipe file
        patch_dir: recipe_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
        ..KitchenConfig::default()
    };
    if let Some(jobs) = jobs {
        config.jobs = jobs;
    }

    let cuda = cuda_prefix.map(|p| CudaToolkit::new(p.clone()));
    if let Some(toolkit) = &cuda {
        if !toolkit_exists(toolkit) {
            warn!("no nvcc under {}", toolkit.prefix.display());
        }
    }

    let kitchen = Kitchen::new(config);
    let result = kitchen.cook(&recipe, &selection, cuda.as_ref(), prefix)?;

    for warning in &result.warnings {
        warn!("{}", warning);
    }
    info!(
        "installed {} {} into {}",
        recipe.package.name,
        selection.version,
        result.prefix.display()
    );
    Ok(())
}
