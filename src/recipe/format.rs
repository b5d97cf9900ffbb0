// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe how to fetch, patch, and build an
//! autotools-based library, and what artifacts it installs. Everything a
//! recipe declares is static data: the release table, the variant set,
//! conflict rules, conditional patches, and language-binding libraries.

use crate::error::{Error, Result};
use crate::hash::Checksum;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A complete recipe for building a library from source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Release table: version → checksum
    #[serde(rename = "release", default)]
    pub releases: Vec<Release>,

    /// Declared build variants
    #[serde(rename = "variant", default)]
    pub variants: Vec<VariantDecl>,

    /// Mutual-exclusion rules over variant selections
    #[serde(rename = "conflict", default)]
    pub conflicts: Vec<ConflictRule>,

    /// Conditional patches, applied in declaration order
    #[serde(rename = "patch", default)]
    pub patches: Vec<PatchRule>,

    /// Language-binding libraries installed alongside the base library
    #[serde(rename = "binding", default)]
    pub bindings: Vec<BindingRule>,

    /// Build commands and baseline flags
    #[serde(default)]
    pub build: BuildSection,

    /// Compiler-specific flag and tool overrides
    #[serde(rename = "toolchain", default)]
    pub toolchains: Vec<ToolchainTweak>,
}

impl Recipe {
    /// Look up a release by version string
    pub fn release(&self, version: &str) -> Result<&Release> {
        self.releases
            .iter()
            .find(|r| r.version == version)
            .ok_or_else(|| Error::UnknownVersion(version.to_string()))
    }

    /// The highest numbered release (named branch versions are skipped)
    pub fn preferred_version(&self) -> Result<Version> {
        self.releases
            .iter()
            .filter_map(|r| Version::parse(&r.version).ok())
            .filter(|v| !v.is_named())
            .max()
            .ok_or_else(|| Error::ParseError("recipe has no numbered releases".to_string()))
    }

    /// Look up a variant declaration by name
    pub fn variant(&self, name: &str) -> Result<&VariantDecl> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| Error::UnknownVariant(name.to_string()))
    }

    /// The archive URL for a release, with `%(version)s` substituted
    pub fn archive_url(&self, release: &Release) -> String {
        let template = release.url.as_deref().unwrap_or(&self.package.url);
        template.replace("%(version)s", &release.version)
    }

    /// The archive filename for a release
    pub fn archive_filename(&self, release: &Release) -> String {
        format!("{}-{}.tar.gz", self.package.name, release.version)
    }

    /// Binding libraries for a language at a given version
    ///
    /// The first binding rule for the language whose predicate covers the
    /// version wins; rules are checked in declaration order.
    pub fn binding_libs(&self, language: &str, version: &Version) -> Vec<String> {
        use crate::version::VersionRange;

        for rule in &self.bindings {
            if rule.language != language {
                continue;
            }
            let applies = match &rule.when {
                Some(range) => VersionRange::parse(range)
                    .map(|r| r.contains(version))
                    .unwrap_or(false),
                None => true,
            };
            if applies {
                return rule.libs.clone();
            }
        }
        Vec::new()
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Archive URL template (supports `%(version)s` substitution)
    pub url: String,

    /// Base library name installed under the prefix (e.g. "libxc")
    pub base_lib: String,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,
}

/// A single entry in the release table
///
/// Immutable once published; named branch versions carry no checksum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Version identifier
    pub version: String,

    /// Published sha256 digest of the source archive
    #[serde(default)]
    pub sha256: Option<String>,

    /// URL override for this release (template otherwise)
    #[serde(default)]
    pub url: Option<String>,
}

impl Release {
    /// The checksum for this release, if one is published
    pub fn checksum(&self) -> Result<Checksum> {
        let hex = self.sha256.as_deref().ok_or_else(|| {
            Error::DownloadError(format!(
                "no checksum published for version {}",
                self.version
            ))
        })?;
        Checksum::from_sha256_hex(hex)
    }
}

/// The value a variant carries: boolean toggle, single value, or value list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Single(String),
    List(Vec<String>),
}

impl VariantValue {
    /// Whether this is a boolean variant that is switched on
    pub fn is_on(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Whether this value carries (or contains) the given string
    pub fn has(&self, value: &str) -> bool {
        match self {
            Self::Bool(_) => false,
            Self::Single(s) => s == value,
            Self::List(items) => items.iter().any(|i| i == value),
        }
    }

    /// The carried values, in order (empty for booleans)
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Bool(_) => Vec::new(),
            Self::Single(s) => vec![s.as_str()],
            Self::List(items) => items.iter().map(|s| s.as_str()).collect(),
        }
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Single(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

/// A declared build variant: name, default value, description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDecl {
    /// Variant name
    pub name: String,

    /// Default value when the caller does not select one
    pub default: VariantValue,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Allowed values for enumerated variants (empty = unrestricted)
    #[serde(default)]
    pub values: Vec<String>,
}

impl VariantDecl {
    /// Whether this is a boolean toggle
    pub fn is_bool(&self) -> bool {
        matches!(self.default, VariantValue::Bool(_))
    }
}

/// A mutual-exclusion rule evaluated before any build step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRule {
    /// The offending selection, e.g. `+shared +cuda`
    pub spec: String,

    /// Additional applicability predicate, e.g. `@:4`
    #[serde(default)]
    pub when: Option<String>,

    /// Message reported when the rule fires
    pub msg: String,
}

/// A conditional patch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRule {
    /// Patch file, relative to the recipe file
    pub file: String,

    /// Applicability predicate over version/compiler
    #[serde(default)]
    pub when: Option<String>,

    /// Strip level passed to `patch -p`
    #[serde(default = "default_strip")]
    pub strip: u32,
}

fn default_strip() -> u32 {
    1
}

/// Language-binding libraries for a version range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingRule {
    /// Query parameter that activates this rule (e.g. "fortran")
    pub language: String,

    /// Binding library names, prepended (in order) to the base library
    pub libs: Vec<String>,

    /// Version range this rule covers
    #[serde(default)]
    pub when: Option<String>,
}

/// Build commands and baseline flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Baseline optimization flags appended to CFLAGS/FCFLAGS
    #[serde(default = "default_optflags")]
    pub optflags: String,

    /// Configure script (arguments are generated from the selection)
    #[serde(default = "default_configure")]
    pub configure: String,

    /// Compile command
    #[serde(default = "default_make")]
    pub make: String,

    /// Install command
    #[serde(default = "default_install")]
    pub install: String,

    /// Extra environment variables set during the build
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            optflags: default_optflags(),
            configure: default_configure(),
            make: default_make(),
            install: default_install(),
            environment: HashMap::new(),
        }
    }
}

fn default_optflags() -> String {
    "-O2".to_string()
}

fn default_configure() -> String {
    "./configure".to_string()
}

fn default_make() -> String {
    "make".to_string()
}

fn default_install() -> String {
    "make install".to_string()
}

/// Compiler-specific flag and tool overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainTweak {
    /// Compiler identity this tweak applies to (e.g. "intel")
    pub compiler: String,

    /// Extra optimization flags appended after the baseline
    #[serde(default)]
    pub optflags: Option<String>,

    /// Substitute archiver, used only when present on PATH
    #[serde(default)]
    pub ar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RECIPE: &str = r#"
[package]
name = "libxc"
url = "https://www.tddft.org/programs/libxc/down.php?file=%(version)s/libxc-%(version)s.tar.gz"
base_lib = "libxc"
summary = "Exchange-correlation functionals for density-functional theory"

[[release]]
version = "5.0.0"
sha256 = "1cdc57930f7b57da4eb9b2c55a50ba1c2c385936ddaf5582fee830994461a892"

[[release]]
version = "4.3.4"
sha256 = "a8ee37ddc5079339854bd313272856c9d41a27802472ee9ae44b58ee9a298337"

[[release]]
version = "develop"

[[variant]]
name = "shared"
default = true
description = "Build shared libraries"

[[variant]]
name = "cuda"
default = false

[[variant]]
name = "cuda_arch"
default = "none"
values = ["none", "60", "70", "80"]

[[conflict]]
spec = "+shared +cuda"
msg = "Only ~shared supported with +cuda"

[[patch]]
file = "patches/fix-pointer-cast.patch"
when = "@5.0.0"

[[binding]]
language = "fortran"
libs = ["libxcf90"]
when = ":3"

[[binding]]
language = "fortran"
libs = ["libxcf90", "libxcf03"]
when = "4:"
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        assert_eq!(recipe.package.name, "libxc");
        assert_eq!(recipe.releases.len(), 3);
        assert_eq!(recipe.variants.len(), 3);
        assert_eq!(recipe.conflicts.len(), 1);
        assert_eq!(recipe.patches.len(), 1);
        assert_eq!(recipe.patches[0].strip, 1);
    }

    #[test]
    fn test_release_lookup() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        let release = recipe.release("4.3.4").unwrap();
        assert!(release.sha256.is_some());
        assert!(recipe.release("9.9.9").is_err());
    }

    #[test]
    fn test_release_checksum() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        let release = recipe.release("5.0.0").unwrap();
        assert!(release.checksum().is_ok());

        // Named branch version has no published checksum
        let develop = recipe.release("develop").unwrap();
        assert!(develop.checksum().is_err());
    }

    #[test]
    fn test_preferred_version() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        // develop is skipped even though it sorts highest
        assert_eq!(recipe.preferred_version().unwrap().as_str(), "5.0.0");
    }

    #[test]
    fn test_archive_url_substitution() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        let release = recipe.release("4.3.4").unwrap();
        let url = recipe.archive_url(release);
        assert!(url.contains("4.3.4"));
        assert!(!url.contains("%(version)s"));
    }

    #[test]
    fn test_binding_libs_threshold() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();

        let old = Version::parse("3.0.0").unwrap();
        assert_eq!(recipe.binding_libs("fortran", &old), vec!["libxcf90"]);

        let new = Version::parse("4.3.4").unwrap();
        assert_eq!(
            recipe.binding_libs("fortran", &new),
            vec!["libxcf90", "libxcf03"]
        );

        assert!(recipe.binding_libs("python", &new).is_empty());
    }

    #[test]
    fn test_variant_value_helpers() {
        assert!(VariantValue::Bool(true).is_on());
        assert!(!VariantValue::Bool(false).is_on());
        assert!(!VariantValue::Single("none".to_string()).is_on());

        let list = VariantValue::List(vec!["60".to_string(), "70".to_string()]);
        assert!(list.has("70"));
        assert!(!list.has("80"));
        assert_eq!(list.values(), vec!["60", "70"]);
    }

    #[test]
    fn test_build_section_defaults() {
        let recipe: Recipe = toml::from_str(SAMPLE_RECIPE).unwrap();
        assert_eq!(recipe.build.optflags, "-O2");
        assert_eq!(recipe.build.configure, "./configure");
        assert_eq!(recipe.build.make, "make");
        assert_eq!(recipe.build.install, "make install");
    }
}
