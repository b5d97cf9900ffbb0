// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::constraint::When;
use crate::error::{Error, Result};
use crate::hash::Checksum;
use crate::recipe::format::Recipe;
use crate::version::Version;
use std::collections::HashSet;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)?;
    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors are malformed declarations the engine cannot act on;
/// the returned strings are advisory warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("package name cannot be empty".to_string()));
    }
    if recipe.package.base_lib.is_empty() {
        return Err(Error::ParseError("base_lib cannot be empty".to_string()));
    }
    if recipe.releases.is_empty() {
        return Err(Error::ParseError("release table is empty".to_string()));
    }

    // Release table: versions parse, no duplicates, checksums well-formed
    let mut seen = HashSet::new();
    for release in &recipe.releases {
        let version = Version::parse(&release.version)?;
        if !seen.insert(release.version.clone()) {
            return Err(Error::ParseError(format!(
                "duplicate release: {}",
                release.version
            )));
        }
        match &release.sha256 {
            Some(hex) => {
                Checksum::from_sha256_hex(hex)?;
            }
            None if version.is_named() => {}
            None => {
                return Err(Error::ParseError(format!(
                    "release {} has no checksum",
                    release.version
                )));
            }
        }
    }

    // Variants: unique names, defaults inside the declared value set
    let mut variant_names = HashSet::new();
    for variant in &recipe.variants {
        if !variant_names.insert(variant.name.as_str()) {
            return Err(Error::ParseError(format!(
                "duplicate variant: {}",
                variant.name
            )));
        }
        if !variant.values.is_empty() {
            for value in variant.default.values() {
                if !variant.values.iter().any(|v| v == value) {
                    return Err(Error::ParseError(format!(
                        "variant {} default '{}' is not an allowed value",
                        variant.name, value
                    )));
                }
            }
        }
    }

    // Conflict and patch predicates must parse, and conflict specs must
    // only refer to declared variants
    for conflict in &recipe.conflicts {
        let spec = When::parse(&conflict.spec)?;
        for cond in &spec.variants {
            if !variant_names.contains(cond.name()) {
                return Err(Error::ParseError(format!(
                    "conflict '{}' refers to undeclared variant {}",
                    conflict.spec,
                    cond.name()
                )));
            }
        }
        if let Some(when) = &conflict.when {
            When::parse(when)?;
        }
        if conflict.msg.is_empty() {
            warnings.push(format!("conflict '{}' has no message", conflict.spec));
        }
    }

    for patch in &recipe.patches {
        if let Some(when) = &patch.when {
            When::parse(when)?;
        }
    }

    for binding in &recipe.bindings {
        if binding.libs.is_empty() {
            return Err(Error::ParseError(format!(
                "binding for '{}' declares no libraries",
                binding.language
            )));
        }
        if let Some(when) = &binding.when {
            crate::version::VersionRange::parse(when)?;
        }
    }

    if recipe.package.summary.is_none() {
        warnings.push("missing package summary".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("missing package license".to_string());
    }
    if !recipe.package.url.contains("%(version)s") {
        warnings.push("archive URL does not contain %(version)s".to_string());
    }

    Ok(warnings)
}
