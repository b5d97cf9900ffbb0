// src/kitchen.rs

//! Kitchen: the build pipeline for cooking recipes
//!
//! A cook runs sequentially: fetch (checksum-verified, cached) → unpack →
//! patch → configure → compile → install → check. The check phase is a
//! deliberate no-op: the upstream test suite is known to be unreliable, so
//! skipping it is a decision recorded in the build log, not an error.

use crate::env::{prepare_build_environment, BuildEnv, CudaToolkit};
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::selection::{applicable_patches, configure_args, validate_conflicts, Selection};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Directory for downloaded source archives
    pub source_cache: PathBuf,
    /// Number of parallel compile jobs
    pub jobs: u32,
    /// Keep the build directory after completion (for debugging)
    pub keep_builddir: bool,
    /// Directory patch files are resolved against (usually the recipe dir)
    pub patch_dir: PathBuf,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            source_cache: PathBuf::from("/var/cache/mason/sources"),
            jobs,
            keep_builddir: false,
            patch_dir: PathBuf::from("."),
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// The populated installation prefix
    pub prefix: PathBuf,
    /// Build log
    pub log: String,
    /// Warnings generated during the build
    pub warnings: Vec<String>,
}

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    config: KitchenConfig,
}

impl Kitchen {
    pub fn new(config: KitchenConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    /// Cook a recipe for a selection, installing into `prefix`
    pub fn cook(
        &self,
        recipe: &Recipe,
        selection: &Selection,
        cuda: Option<&CudaToolkit>,
        prefix: &Path,
    ) -> Result<CookResult> {
        info!(
            "cooking {} {} ({})",
            recipe.package.name, selection.version, selection
        );

        // Conflicts abort before anything touches the filesystem
        validate_conflicts(recipe, selection)?;

        // One environment for the whole cook: every phase after unpack
        // runs with the same prepared variables
        let mut env = BuildEnv::new();
        prepare_build_environment(recipe, selection, cuda, &mut env)?;

        let mut cook = Cook::new(self, recipe, selection)?;

        cook.fetch()?;
        cook.unpack()?;
        cook.patch()?;
        cook.configure(&env, prefix)?;
        cook.compile(&env)?;
        cook.install(&env)?;
        cook.check();

        let Cook {
            log,
            warnings,
            build_dir,
            ..
        } = cook;
        if self.config.keep_builddir {
            #[allow(deprecated)]
            let kept = build_dir.into_path();
            info!("build directory kept at {}", kept.display());
        }

        Ok(CookResult {
            prefix: prefix.to_path_buf(),
            log,
            warnings,
        })
    }

    /// Fetch a source archive, verifying and caching by checksum
    fn fetch_source(&self, url: &str, checksum: &crate::hash::Checksum) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.source_cache)?;

        let cached_path = self.config.source_cache.join(checksum.hex());

        if cached_path.exists() {
            match checksum.verify_file(&cached_path) {
                Ok(()) => {
                    debug!("using cached source: {}", cached_path.display());
                    return Ok(cached_path);
                }
                Err(_) => {
                    warn!("cached file checksum mismatch, re-downloading");
                    fs::remove_file(&cached_path)?;
                }
            }
        }

        info!("downloading {}", url);
        let temp_path = self
            .config
            .source_cache
            .join(format!("{}.tmp", checksum.hex()));

        download_file(url, &temp_path)?;

        if let Err(e) = checksum.verify_file(&temp_path) {
            fs::remove_file(&temp_path)?;
            return Err(e);
        }

        fs::rename(&temp_path, &cached_path)?;
        Ok(cached_path)
    }
}

/// A single cook in progress
struct Cook<'a> {
    kitchen: &'a Kitchen,
    recipe: &'a Recipe,
    selection: &'a Selection,
    build_dir: TempDir,
    source_dir: PathBuf,
    log: String,
    warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, selection: &'a Selection) -> Result<Self> {
        let build_dir = TempDir::new()?;
        let source_dir = build_dir.path().join("source");
        fs::create_dir_all(&source_dir)?;

        Ok(Self {
            kitchen,
            recipe,
            selection,
            build_dir,
            source_dir,
            log: String::new(),
            warnings: Vec::new(),
        })
    }

    /// Fetch the source archive for the selected release
    fn fetch(&mut self) -> Result<()> {
        let release = self.recipe.release(self.selection.version.as_str())?;
        let checksum = release.checksum()?;
        let url = self.recipe.archive_url(release);

        let cached = self.kitchen.fetch_source(&url, &checksum)?;
        let local = self
            .build_dir
            .path()
            .join(self.recipe.archive_filename(release));
        fs::copy(&cached, &local)?;

        self.log_line(&format!("fetched {}", url));
        Ok(())
    }

    /// Unpack the archive and descend into its top-level directory
    fn unpack(&mut self) -> Result<()> {
        let release = self.recipe.release(self.selection.version.as_str())?;
        let archive = self
            .build_dir
            .path()
            .join(self.recipe.archive_filename(release));

        extract_archive(&archive, &self.source_dir)?;
        self.log_line(&format!("extracted to {}", self.source_dir.display()));

        let entries: Vec<_> = fs::read_dir(&self.source_dir)?
            .filter_map(|e| e.ok())
            .collect();
        if entries.len() == 1 && entries[0].file_type().map(|t| t.is_dir()).unwrap_or(false) {
            self.source_dir = entries[0].path();
            debug!("source directory: {}", self.source_dir.display());
        }

        Ok(())
    }

    /// Apply the patches whose predicates hold, in declaration order
    fn patch(&mut self) -> Result<()> {
        let patches = applicable_patches(self.recipe, self.selection)?;

        for rule in patches {
            let patch_path = self.kitchen.config.patch_dir.join(&rule.file);
            if !patch_path.exists() {
                return Err(Error::NotFound(format!(
                    "patch file not found: {}",
                    patch_path.display()
                )));
            }

            info!("applying patch {}", rule.file);
            apply_patch(&self.source_dir, &patch_path, rule.strip)?;
            self.log_line(&format!("applied patch {}", rule.file));
        }

        Ok(())
    }

    /// Run configure with the generated arguments and prepared environment
    fn configure(&mut self, env: &BuildEnv, prefix: &Path) -> Result<()> {
        let args = configure_args(self.recipe, self.selection);
        let command = format!(
            "{} --prefix={} {}",
            self.recipe.build.configure,
            prefix.display(),
            args.join(" ")
        );

        self.run_build_step("configure", &command, env)
    }

    fn compile(&mut self, env: &BuildEnv) -> Result<()> {
        let command = format!("{} -j{}", self.recipe.build.make, self.kitchen.config.jobs);
        self.run_build_step("compile", &command, env)
    }

    fn install(&mut self, env: &BuildEnv) -> Result<()> {
        let command = self.recipe.build.install.clone();
        self.run_build_step("install", &command, env)
    }

    /// Deliberate no-op: upstream test suite is known to be unreliable
    fn check(&mut self) {
        info!("skipping upstream test suite (known unreliable)");
        self.log_line("check: skipped (upstream test suite unreliable)");
    }

    fn run_build_step(&mut self, phase: &str, command: &str, env: &BuildEnv) -> Result<()> {
        info!("running {} phase", phase);
        debug!("command: {}", command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.source_dir)
            .envs(env.iter())
            .output()
            .map_err(|e| Error::BuildError(format!("failed to run {} phase: {}", phase, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        self.log_line(&format!("=== {} ===", phase));
        if !stdout.is_empty() {
            self.log.push_str(&stdout);
            self.log.push('\n');
        }
        if !stderr.is_empty() {
            self.log.push_str(&stderr);
            self.log.push('\n');
        }

        if !output.status.success() {
            return Err(Error::BuildError(format!(
                "{} phase failed with exit code {:?}\nstderr: {}",
                phase,
                output.status.code(),
                stderr
            )));
        }

        Ok(())
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }
}

/// Download a file from a URL via curl
fn download_file(url: &str, dest: &Path) -> Result<()> {
    let dest_str = dest
        .to_str()
        .ok_or_else(|| Error::DownloadError("non-utf8 destination path".to_string()))?;

    let output = Command::new("curl")
        .args(["-fsSL", "-o", dest_str, url])
        .output()
        .map_err(|e| Error::DownloadError(format!("curl failed: {}", e)))?;

    if !output.status.success() {
        return Err(Error::DownloadError(format!(
            "failed to download {}: {}",
            url,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Extract a tar archive into `dest`
fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let archive_str = archive
        .to_str()
        .ok_or_else(|| Error::ParseError("non-utf8 archive path".to_string()))?;
    let dest_str = dest
        .to_str()
        .ok_or_else(|| Error::ParseError("non-utf8 destination path".to_string()))?;

    let file_name = archive.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let args: Vec<&str> = if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
        vec!["-xzf", archive_str, "-C", dest_str]
    } else if file_name.ends_with(".tar.xz") {
        vec!["-xJf", archive_str, "-C", dest_str]
    } else if file_name.ends_with(".tar.bz2") {
        vec!["-xjf", archive_str, "-C", dest_str]
    } else if file_name.ends_with(".tar") {
        vec!["-xf", archive_str, "-C", dest_str]
    } else {
        return Err(Error::ParseError(format!(
            "unknown archive format: {}",
            file_name
        )));
    };

    let output = Command::new("tar")
        .args(&args)
        .output()
        .map_err(|e| Error::BuildError(format!("tar failed: {}", e)))?;

    if !output.status.success() {
        return Err(Error::BuildError(format!(
            "failed to extract archive: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Apply a patch to the source tree
fn apply_patch(source_dir: &Path, patch_path: &Path, strip: u32) -> Result<()> {
    let patch_str = patch_path
        .to_str()
        .ok_or_else(|| Error::ParseError("non-utf8 patch path".to_string()))?;

    let output = Command::new("patch")
        .args(["-p", &strip.to_string(), "-i", patch_str])
        .current_dir(source_dir)
        .output()
        .map_err(|e| Error::BuildError(format!("patch failed: {}", e)))?;

    if !output.status.success() {
        return Err(Error::BuildError(format!(
            "failed to apply patch: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}
