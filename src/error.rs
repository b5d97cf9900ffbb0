// src/error.rs

//! Error types shared across the crate

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed recipe, version, or constraint syntax
    #[error("parse error: {0}")]
    ParseError(String),

    /// The selected variants violate a declared conflict rule.
    ///
    /// Carries the human-readable message from the recipe; raised before
    /// any build step runs.
    #[error("{message}")]
    Conflict { message: String },

    /// A fetched source archive did not match its published checksum
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Version string not present in the recipe's release table
    #[error("unknown version: {0}")]
    UnknownVersion(String),

    /// Variant name not declared by the recipe
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// The library locator found nothing matching under the prefix
    #[error("no libraries matching {names:?} found under {root}")]
    LibrariesNotFound { names: Vec<String>, root: PathBuf },

    #[error("download failed: {0}")]
    DownloadError(String),

    #[error("build failed: {0}")]
    BuildError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
