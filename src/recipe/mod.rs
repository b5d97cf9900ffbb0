// src/recipe/mod.rs

//! Declarative build recipes
//!
//! A recipe captures everything needed to build one library from source:
//! - The release table (version → source checksum)
//! - Variants (user-selectable build options with defaults)
//! - Conflict rules between variant selections
//! - Conditional patches keyed on version and compiler
//! - Language-binding libraries the install tree carries
//! - Build commands and compiler-specific flag tweaks
//!
//! The recipe itself is pure data; selecting a version and variants
//! produces a [`crate::selection::Selection`], and the
//! [`crate::kitchen::Kitchen`] drives the actual build.
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "libxc"
//! url = "https://www.tddft.org/programs/libxc/down.php?file=%(version)s/libxc-%(version)s.tar.gz"
//! base_lib = "libxc"
//!
//! [[release]]
//! version = "5.0.0"
//! sha256 = "1cdc57930f7b57da4eb9b2c55a50ba1c2c385936ddaf5582fee830994461a892"
//!
//! [[variant]]
//! name = "shared"
//! default = true
//! description = "Build shared libraries"
//!
//! [[conflict]]
//! spec = "+shared +cuda"
//! msg = "Only ~shared supported with +cuda"
//! ```

mod format;
pub mod parser;

pub use format::{
    BindingRule, BuildSection, ConflictRule, PackageSection, PatchRule, Recipe, Release,
    ToolchainTweak, VariantDecl, VariantValue,
};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
