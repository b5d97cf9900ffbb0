// src/constraint.rs

//! `when` predicates for conflicts, patches, and binding rules
//!
//! A predicate is a whitespace-separated list of tokens over the selected
//! build: `+name` (boolean variant on), `~name` (off), `name=value`
//! (enumerated variant carries the value), `@range` (version range), and
//! `%compiler` (compiler identity). All tokens must hold for the predicate
//! to match. An empty predicate always matches.

use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::version::VersionRange;
use std::fmt;
use std::str::FromStr;

/// A single variant condition inside a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantCond {
    /// `+name`: boolean variant must be enabled
    On(String),
    /// `~name`: boolean variant must be disabled
    Off(String),
    /// `name=value`: enumerated variant must carry (or contain) the value
    Equals(String, String),
}

impl VariantCond {
    fn parse(token: &str) -> Result<Self> {
        if let Some(name) = token.strip_prefix('+') {
            if name.is_empty() {
                return Err(Error::ParseError("missing name after +".to_string()));
            }
            Ok(Self::On(name.to_string()))
        } else if let Some(name) = token.strip_prefix('~') {
            if name.is_empty() {
                return Err(Error::ParseError("missing name after ~".to_string()));
            }
            Ok(Self::Off(name.to_string()))
        } else if let Some((name, value)) = token.split_once('=') {
            if name.is_empty() || value.is_empty() {
                return Err(Error::ParseError(format!(
                    "invalid variant condition: {}",
                    token
                )));
            }
            Ok(Self::Equals(name.to_string(), value.to_string()))
        } else {
            Err(Error::ParseError(format!(
                "invalid predicate token: {} (expected +name, ~name, or name=value)",
                token
            )))
        }
    }

    /// The variant name this condition refers to
    pub fn name(&self) -> &str {
        match self {
            Self::On(n) | Self::Off(n) | Self::Equals(n, _) => n,
        }
    }
}

impl fmt::Display for VariantCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On(n) => write!(f, "+{}", n),
            Self::Off(n) => write!(f, "~{}", n),
            Self::Equals(n, v) => write!(f, "{}={}", n, v),
        }
    }
}

/// A full predicate over the selected build
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct When {
    pub variants: Vec<VariantCond>,
    pub version: Option<VersionRange>,
    pub compiler: Option<String>,
}

impl When {
    /// A predicate that matches every selection
    pub fn always() -> Self {
        Self::default()
    }

    /// Parse a predicate string like `+cuda @:4 %nvhpc`
    pub fn parse(s: &str) -> Result<Self> {
        let mut variants = Vec::new();
        let mut version = None;
        let mut compiler = None;

        for token in s.split_whitespace() {
            if let Some(range) = token.strip_prefix('@') {
                if version.is_some() {
                    return Err(Error::ParseError(format!(
                        "duplicate version range in predicate: {}",
                        s
                    )));
                }
                version = Some(VersionRange::parse(range)?);
            } else if let Some(name) = token.strip_prefix('%') {
                if name.is_empty() {
                    return Err(Error::ParseError("missing compiler after %".to_string()));
                }
                if compiler.is_some() {
                    return Err(Error::ParseError(format!(
                        "duplicate compiler in predicate: {}",
                        s
                    )));
                }
                compiler = Some(name.to_string());
            } else {
                variants.push(VariantCond::parse(token)?);
            }
        }

        Ok(Self {
            variants,
            version,
            compiler,
        })
    }

    /// Whether this predicate holds for the given selection
    pub fn matches(&self, selection: &Selection) -> bool {
        if let Some(range) = &self.version {
            if !range.contains(&selection.version) {
                return false;
            }
        }

        if let Some(compiler) = &self.compiler {
            if selection.compiler.name != *compiler {
                return false;
            }
        }

        for cond in &self.variants {
            let holds = match cond {
                VariantCond::On(name) => selection.variant_on(name),
                VariantCond::Off(name) => !selection.variant_on(name),
                VariantCond::Equals(name, value) => selection.variant_has(name, value),
            };
            if !holds {
                return false;
            }
        }

        true
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.variants.iter().map(|c| c.to_string()).collect();
        if let Some(range) = &self.version {
            parts.push(format!("@{}", range));
        }
        if let Some(compiler) = &self.compiler {
            parts.push(format!("%{}", compiler));
        }
        write!(f, "{}", parts.join(" "))
    }
}

impl FromStr for When {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        When::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant_conds() {
        let when = When::parse("+cuda ~shared cuda_arch=70").unwrap();
        assert_eq!(when.variants.len(), 3);
        assert_eq!(when.variants[0], VariantCond::On("cuda".to_string()));
        assert_eq!(when.variants[1], VariantCond::Off("shared".to_string()));
        assert_eq!(
            when.variants[2],
            VariantCond::Equals("cuda_arch".to_string(), "70".to_string())
        );
        assert!(when.version.is_none());
        assert!(when.compiler.is_none());
    }

    #[test]
    fn test_parse_version_and_compiler() {
        let when = When::parse("@:4 %nvhpc").unwrap();
        assert!(when.variants.is_empty());
        assert!(when.version.is_some());
        assert_eq!(when.compiler.as_deref(), Some("nvhpc"));
    }

    #[test]
    fn test_parse_empty_always_matches() {
        let when = When::parse("").unwrap();
        assert_eq!(when, When::always());
    }

    #[test]
    fn test_parse_errors() {
        assert!(When::parse("+").is_err());
        assert!(When::parse("~").is_err());
        assert!(When::parse("%").is_err());
        assert!(When::parse("bare_name").is_err());
        assert!(When::parse("@1:2 @3:4").is_err());
        assert!(When::parse("%gcc %intel").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["+cuda ~shared", "@:4 %nvhpc", "+cuda @5: %intel"] {
            let when = When::parse(s).unwrap();
            assert_eq!(When::parse(&when.to_string()).unwrap(), when);
        }
    }
}
