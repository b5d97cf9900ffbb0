// src/libs.rs

//! Library locator: find installed artifacts under a prefix
//!
//! Callers query the installed tree with extra parameters: `"static"`
//! forces the static artifacts regardless of the shared-variant default,
//! and a language parameter like `"fortran"` prepends the binding
//! libraries the recipe declares for the selected version.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::selection::Selection;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively search `root` for libraries with the given base names
///
/// Shared libraries match `NAME.so` and versioned `NAME.so.*`; static
/// libraries match `NAME.a`. Results are ordered by the `names` list, with
/// matches for one name sorted by path for determinism. Fails with
/// [`Error::LibrariesNotFound`] when nothing matches.
pub fn find_libraries(
    names: &[String],
    root: &Path,
    shared: bool,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut found: Vec<Vec<PathBuf>> = vec![Vec::new(); names.len()];
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        for (i, name) in names.iter().enumerate() {
            if matches_library(file_name, name, shared) {
                found[i].push(entry.path().to_path_buf());
            }
        }
    }

    let mut results = Vec::new();
    for mut paths in found {
        paths.sort();
        results.extend(paths);
    }

    if results.is_empty() {
        return Err(Error::LibrariesNotFound {
            names: names.to_vec(),
            root: root.to_path_buf(),
        });
    }

    debug!(count = results.len(), root = %root.display(), "located libraries");
    Ok(results)
}

fn matches_library(file_name: &str, base: &str, shared: bool) -> bool {
    if shared {
        file_name == format!("{}.so", base)
            || file_name
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix(".so."))
                .is_some_and(|suffix| !suffix.is_empty())
    } else {
        file_name == format!("{}.a", base)
    }
}

/// Locate the libraries a selection installs under `prefix`
///
/// Shared-vs-static combines the `shared` variant with the caller's query:
/// an explicit `"static"` parameter overrides the shared default. Language
/// parameters prepend the recipe's binding libraries for the selected
/// version, in declaration order, ahead of the base library.
pub fn libs(
    recipe: &Recipe,
    selection: &Selection,
    prefix: &Path,
    query_parameters: &[&str],
) -> Result<Vec<PathBuf>> {
    let mut names = vec![recipe.package.base_lib.clone()];

    let shared = selection.variant_on("shared") && !query_parameters.contains(&"static");

    for rule in &recipe.bindings {
        if query_parameters.contains(&rule.language.as_str()) {
            let binding = recipe.binding_libs(&rule.language, &selection.version);
            if !binding.is_empty() {
                let mut with_bindings = binding;
                with_bindings.extend(names);
                names = with_bindings;
                break;
            }
        }
    }

    find_libraries(&names, prefix, shared, true)
}
