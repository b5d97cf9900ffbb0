// src/selection.rs

//! A concrete build selection: version, variant values, compiler
//!
//! A selection is made once per build and is read-only afterwards. All
//! predicates (conflicts, patches, toolchain tweaks) evaluate against it.

use crate::constraint::When;
use crate::error::{Error, Result};
use crate::recipe::{PatchRule, Recipe, VariantValue};
use crate::version::Version;
use std::collections::BTreeMap;
use std::fmt;

/// The compiler identity a build runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    /// Vendor name used in `%name` predicates and toolchain tweaks
    pub name: String,
    /// The C compiler command, routed through accelerator wrappers when needed
    pub cc: String,
}

impl Compiler {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            cc: default_cc(&name),
            name,
        }
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new("gcc")
    }
}

fn default_cc(name: &str) -> String {
    match name {
        "intel" => "icc".to_string(),
        "nvhpc" => "nvc".to_string(),
        "clang" => "clang".to_string(),
        _ => "gcc".to_string(),
    }
}

/// A resolved build selection
#[derive(Debug, Clone)]
pub struct Selection {
    /// The selected release version
    pub version: Version,
    /// Variant name → selected value, seeded from declared defaults
    pub variants: BTreeMap<String, VariantValue>,
    /// Compiler identity
    pub compiler: Compiler,
}

impl Selection {
    /// Build a selection for a version in the recipe's release table,
    /// with every variant at its declared default
    pub fn from_recipe(recipe: &Recipe, version: &str, compiler: Compiler) -> Result<Self> {
        recipe.release(version)?;
        let version = Version::parse(version)?;

        let variants = recipe
            .variants
            .iter()
            .map(|v| (v.name.clone(), v.default.clone()))
            .collect();

        Ok(Self {
            version,
            variants,
            compiler,
        })
    }

    /// Override a variant value; the variant must be declared
    pub fn set_variant(
        &mut self,
        recipe: &Recipe,
        name: &str,
        value: VariantValue,
    ) -> Result<()> {
        let decl = recipe.variant(name)?;
        if !decl.values.is_empty() {
            for v in value.values() {
                if !decl.values.iter().any(|allowed| allowed == v) {
                    return Err(Error::ParseError(format!(
                        "'{}' is not an allowed value for variant {}",
                        v, name
                    )));
                }
            }
        }
        self.variants.insert(name.to_string(), value);
        Ok(())
    }

    /// Apply a constraint string like `+cuda ~shared cuda_arch=70` as a
    /// set of variant overrides
    pub fn apply_spec(&mut self, recipe: &Recipe, spec: &str) -> Result<()> {
        use crate::constraint::VariantCond;

        let when = When::parse(spec)?;
        if when.version.is_some() || when.compiler.is_some() {
            return Err(Error::ParseError(format!(
                "variant override '{}' cannot carry @version or %compiler",
                spec
            )));
        }
        for cond in when.variants {
            match cond {
                VariantCond::On(name) => {
                    self.set_variant(recipe, &name, VariantValue::Bool(true))?;
                }
                VariantCond::Off(name) => {
                    self.set_variant(recipe, &name, VariantValue::Bool(false))?;
                }
                VariantCond::Equals(name, value) => {
                    self.set_variant(recipe, &name, VariantValue::Single(value))?;
                }
            }
        }
        Ok(())
    }

    /// Whether a boolean variant is switched on
    pub fn variant_on(&self, name: &str) -> bool {
        self.variants.get(name).is_some_and(|v| v.is_on())
    }

    /// Whether a variant carries (or contains) the given value
    pub fn variant_has(&self, name: &str, value: &str) -> bool {
        self.variants.get(name).is_some_and(|v| v.has(value))
    }

    /// The carried values of an enumerated variant, in order
    pub fn variant_values(&self, name: &str) -> Vec<&str> {
        self.variants
            .get(name)
            .map(|v| v.values())
            .unwrap_or_default()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.version)?;
        for (name, value) in &self.variants {
            match value {
                VariantValue::Bool(true) => write!(f, " +{}", name)?,
                VariantValue::Bool(false) => write!(f, " ~{}", name)?,
                other => write!(f, " {}={}", name, other)?,
            }
        }
        write!(f, " %{}", self.compiler.name)
    }
}

/// Check every conflict rule against a selection
///
/// A rule fires when both its spec and its `when` predicate match; the
/// build aborts with the declared message before any step runs.
pub fn validate_conflicts(recipe: &Recipe, selection: &Selection) -> Result<()> {
    for rule in &recipe.conflicts {
        let spec = When::parse(&rule.spec)?;
        if !spec.matches(selection) {
            continue;
        }
        let applies = match &rule.when {
            Some(when) => When::parse(when)?.matches(selection),
            None => true,
        };
        if applies {
            return Err(Error::Conflict {
                message: rule.msg.clone(),
            });
        }
    }
    Ok(())
}

/// Translate the selection into configure flags
///
/// Every boolean variant becomes `--enable-NAME` or `--disable-NAME`, in
/// declaration order.
pub fn configure_args(recipe: &Recipe, selection: &Selection) -> Vec<String> {
    recipe
        .variants
        .iter()
        .filter(|decl| decl.is_bool())
        .map(|decl| {
            if selection.variant_on(&decl.name) {
                format!("--enable-{}", decl.name)
            } else {
                format!("--disable-{}", decl.name)
            }
        })
        .collect()
}

/// The patches that apply to a selection, in declaration order
pub fn applicable_patches<'r>(
    recipe: &'r Recipe,
    selection: &Selection,
) -> Result<Vec<&'r PatchRule>> {
    let mut selected = Vec::new();
    for patch in &recipe.patches {
        let applies = match &patch.when {
            Some(when) => When::parse(when)?.matches(selection),
            None => true,
        };
        if applies {
            selected.push(patch);
        }
    }
    Ok(selected)
}
