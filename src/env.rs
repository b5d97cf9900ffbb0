// src/env.rs

//! Build environment assembly
//!
//! The environment preparer mutates a [`BuildEnv`] in place: baseline
//! optimization flags first, then compiler-specific tweaks from the
//! recipe's toolchain table, then the accelerator rewrite when the `cuda`
//! variant is selected.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::selection::Selection;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// An ordered set of environment variables handed to build commands
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Append a space-separated flag to a variable
    pub fn append_flags(&mut self, key: &str, flags: &str) {
        match self.vars.get_mut(key) {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(flags);
            }
            None => {
                self.vars.insert(key.to_string(), flags.to_string());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Paths into an installed CUDA toolkit
#[derive(Debug, Clone)]
pub struct CudaToolkit {
    pub prefix: PathBuf,
}

impl CudaToolkit {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The toolkit's compiler wrapper
    pub fn nvcc(&self) -> PathBuf {
        self.prefix.join("bin").join("nvcc")
    }
}

/// Assemble the build environment for a selection
///
/// Appends optimization flags to `CFLAGS`/`FCFLAGS`, applies the matching
/// toolchain tweak (extra flags, archiver substitution when the tool is on
/// PATH), and with `+cuda` routes `CC`/`CCLD` through the toolkit's
/// compiler wrapper plus an `-arch=sm_<target>` flag for the selected
/// architecture. Side effect only: the caller's `env` is mutated.
pub fn prepare_build_environment(
    recipe: &Recipe,
    selection: &Selection,
    cuda: Option<&CudaToolkit>,
    env: &mut BuildEnv,
) -> Result<()> {
    let mut optflags = recipe.build.optflags.clone();

    if let Some(tweak) = recipe
        .toolchains
        .iter()
        .find(|t| t.compiler == selection.compiler.name)
    {
        if let Some(extra) = &tweak.optflags {
            optflags.push(' ');
            optflags.push_str(extra);
        }
        if let Some(ar) = &tweak.ar {
            // Substitute the archiver only if the tool actually exists
            if which::which(ar).is_ok() {
                debug!(ar = %ar, "substituting archiver");
                env.set("AR", ar.clone());
            }
        }
    }

    env.append_flags("CFLAGS", &optflags);
    env.append_flags("FCFLAGS", &optflags);

    if selection.variant_on("cuda") {
        let toolkit = cuda.ok_or_else(|| {
            Error::BuildError("cuda selected but no toolkit prefix given".to_string())
        })?;
        let nvcc = toolkit.nvcc();
        let cc = &selection.compiler.cc;

        env.set("CCLD", format!("{} -ccbin {}", nvcc.display(), cc));
        env.set("CC", format!("{} -x cu -ccbin {}", nvcc.display(), cc));

        if let Some(arch) = selection
            .variant_values("cuda_arch")
            .first()
            .filter(|a| **a != "none")
        {
            env.append_flags("CFLAGS", &format!("-arch=sm_{}", arch));
        }
    }

    for (key, value) in &recipe.build.environment {
        env.set(key.clone(), value.clone());
    }

    Ok(())
}

/// Whether a path looks like a usable toolkit prefix
pub fn toolkit_exists(toolkit: &CudaToolkit) -> bool {
    toolkit.nvcc().exists()
}
