// src/lib.rs

//! Mason: declarative source-build recipes for autotools libraries
//!
//! A recipe is static data: a release table with published checksums,
//! user-selectable variants with defaults, conflict rules, conditional
//! patches, and the binding libraries an install carries. The engine turns
//! a selection (version + variants + compiler) into conflict checks,
//! configure arguments, a prepared build environment, and a sequential
//! fetch → patch → configure → compile → install pipeline, and can locate
//! the installed artifacts under a prefix afterwards.

pub mod constraint;
pub mod env;
mod error;
pub mod hash;
pub mod kitchen;
pub mod libs;
pub mod recipe;
pub mod selection;
pub mod version;

pub use constraint::{VariantCond, When};
pub use env::{prepare_build_environment, toolkit_exists, BuildEnv, CudaToolkit};
pub use error::{Error, Result};
pub use hash::Checksum;
pub use kitchen::{CookResult, Kitchen, KitchenConfig};
pub use libs::{find_libraries, libs};
pub use recipe::{parse_recipe, parse_recipe_file, validate_recipe, Recipe, VariantValue};
pub use selection::{
    applicable_patches, configure_args, validate_conflicts, Compiler, Selection,
};
pub use version::{Version, VersionRange};
