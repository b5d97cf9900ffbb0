// tests/common/mod.rs

//! Shared fixtures for the integration suite

#![allow(dead_code)]

use mason::{parse_recipe_file, Recipe};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path to the shipped libxc recipe
pub fn libxc_recipe_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("recipes/libxc.toml")
}

/// Load the shipped libxc recipe
pub fn libxc_recipe() -> Recipe {
    parse_recipe_file(&libxc_recipe_path()).expect("shipped recipe must parse")
}

/// Create a fake installation prefix containing the given library files
/// under `lib/`
pub fn fake_prefix(lib_files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let lib = dir.path().join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    for name in lib_files {
        std::fs::write(lib.join(name), b"").unwrap();
    }
    dir
}

/// File names of located libraries, in result order
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
