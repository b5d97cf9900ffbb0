// src/hash.rs

//! Source archive integrity hashing
//!
//! Recipes publish checksums as `sha256:<hex>`. Fetched archives are
//! verified against them before anything else touches the file; a mismatch
//! is fatal and never retried.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A published checksum in `sha256:<hex>` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    hex: String,
}

impl Checksum {
    /// Build a checksum from a bare hex digest
    pub fn from_sha256_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().to_ascii_lowercase();
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::ParseError(format!(
                "invalid sha256 digest: {}",
                hex
            )));
        }
        Ok(Self { hex })
    }

    /// The bare hex digest
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Verify a file on disk against this checksum
    pub fn verify_file(&self, path: &Path) -> Result<()> {
        let actual = sha256_file(path)?;
        if actual == self.hex {
            Ok(())
        } else {
            Err(Error::ChecksumMismatch {
                expected: self.hex.clone(),
                actual,
            })
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.hex)
    }
}

impl FromStr for Checksum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix("sha256:").ok_or_else(|| {
            Error::ParseError(format!("invalid checksum format: {} (expected sha256:...)", s))
        })?;
        Self::from_sha256_hex(hex)
    }
}

/// Hash a byte slice, returning the lowercase hex digest
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hash a file in streaming fashion, returning the lowercase hex digest
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
