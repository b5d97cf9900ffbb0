// src/version/mod.rs

//! Version handling for release tables and constraint predicates
//!
//! Upstream release versions are dotted numeric strings ("4.3.4"), with a
//! small number of named versions ("develop", "master") that track a branch
//! rather than a tarball. Named versions order after every numeric version.
//!
//! Ranges are inclusive on both ends, and an open upper bound like `:4`
//! covers every `4.x` patch release, which is what conditional patches and
//! conflict rules rely on.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A release version: dotted numeric, or a named branch version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
    /// Numeric components; empty for named versions
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version string
    ///
    /// "4.3.4" → numeric; "develop" → named. Mixed strings like "1.4rc1"
    /// are treated as named (they compare after numeric versions, which is
    /// the safe direction for pre-release branch snapshots).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::ParseError("empty version string".to_string()));
        }

        let parts: Option<Vec<u64>> = s.split('.').map(|p| p.parse::<u64>().ok()).collect();

        Ok(Self {
            raw: s.to_string(),
            parts: parts.unwrap_or_default(),
        })
    }

    /// Whether this is a named (branch) version
    pub fn is_named(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components ("4.3.4" → [4, 3, 4]); empty for named versions
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Whether `prefix` is a component-wise prefix of this version
    ///
    /// "4.3.4" is within "4" and "4.3" but not "4.3.4.1"-within-"4.3.5".
    /// Named versions only prefix-match themselves.
    pub fn has_prefix(&self, prefix: &Version) -> bool {
        if prefix.is_named() || self.is_named() {
            return self.raw == prefix.raw;
        }
        prefix.parts.len() <= self.parts.len()
            && self.parts[..prefix.parts.len()] == prefix.parts[..]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_named(), other.is_named()) {
            // Named versions (develop, master) sort after all releases
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => self.raw.cmp(&other.raw),
            (false, false) => self.parts.cmp(&other.parts),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// An inclusive version range used in `when` predicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Matches every version
    Any,
    /// `=5.0.0`: exactly this version string
    Exact(Version),
    /// `5.0.0`: this version or any sub-release of it (prefix match)
    Prefix(Version),
    /// `a:b`, `a:`, `:b` (inclusive); the upper bound also prefix-matches,
    /// so `:4` covers 4.3.4
    Between {
        lo: Option<Version>,
        hi: Option<Version>,
    },
}

impl VersionRange {
    /// Parse a range body (the part after `@` in a predicate)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Any);
        }

        if let Some(rest) = s.strip_prefix('=') {
            return Ok(Self::Exact(Version::parse(rest)?));
        }

        if let Some(colon) = s.find(':') {
            let lo_str = s[..colon].trim();
            let hi_str = s[colon + 1..].trim();
            if hi_str.contains(':') {
                return Err(Error::ParseError(format!("invalid version range: {}", s)));
            }
            let lo = if lo_str.is_empty() {
                None
            } else {
                Some(Version::parse(lo_str)?)
            };
            let hi = if hi_str.is_empty() {
                None
            } else {
                Some(Version::parse(hi_str)?)
            };
            return Ok(Self::Between { lo, hi });
        }

        Ok(Self::Prefix(Version::parse(s)?))
    }

    /// Whether a version falls inside this range
    pub fn contains(&self, v: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(e) => v == e,
            Self::Prefix(p) => v.has_prefix(p),
            Self::Between { lo, hi } => {
                if let Some(lo) = lo {
                    if v < lo && !v.has_prefix(lo) {
                        return false;
                    }
                }
                if let Some(hi) = hi {
                    if v > hi && !v.has_prefix(hi) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, ":"),
            Self::Exact(v) => write!(f, "={}", v),
            Self::Prefix(v) => write!(f, "{}", v),
            Self::Between { lo, hi } => {
                if let Some(lo) = lo {
                    write!(f, "{}", lo)?;
                }
                write!(f, ":")?;
                if let Some(hi) = hi {
                    write!(f, "{}", hi)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_parse_numeric() {
        let ver = v("4.3.4");
        assert!(!ver.is_named());
        assert_eq!(ver.parts(), &[4, 3, 4]);
    }

    #[test]
    fn test_parse_named() {
        let ver = v("develop");
        assert!(ver.is_named());
        assert!(ver.parts().is_empty());
    }

    #[test]
    fn test_parse_empty_error() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("   ").is_err());
    }

    #[test]
    fn test_ordering_numeric() {
        assert!(v("4.3.2") < v("4.3.4"));
        assert!(v("2.2.2") < v("3.0.0"));
        assert!(v("4.3") < v("4.3.0"));
        assert!(v("10.0") > v("9.9"));
    }

    #[test]
    fn test_named_sorts_last() {
        assert!(v("develop") > v("5.0.0"));
        assert!(v("master") > v("99.0"));
    }

    #[test]
    fn test_has_prefix() {
        assert!(v("4.3.4").has_prefix(&v("4")));
        assert!(v("4.3.4").has_prefix(&v("4.3")));
        assert!(v("4.3.4").has_prefix(&v("4.3.4")));
        assert!(!v("4.3.4").has_prefix(&v("4.3.2")));
        assert!(!v("5.0.0").has_prefix(&v("4")));
        assert!(v("develop").has_prefix(&v("develop")));
        assert!(!v("develop").has_prefix(&v("4")));
    }

    #[test]
    fn test_range_any() {
        assert!(r("").contains(&v("1.0")));
        assert!(r("").contains(&v("develop")));
    }

    #[test]
    fn test_range_exact() {
        let range = r("=5.0.0");
        assert!(range.contains(&v("5.0.0")));
        assert!(!range.contains(&v("5.0.1")));
    }

    #[test]
    fn test_range_prefix() {
        let range = r("5.0.0");
        assert!(range.contains(&v("5.0.0")));
        assert!(!range.contains(&v("5.0.1")));
        assert!(r("5").contains(&v("5.0.1")));
    }

    #[test]
    fn test_range_upper_open() {
        // :4 covers every 4.x release but not 5.0.0
        let range = r(":4");
        assert!(range.contains(&v("2.2.2")));
        assert!(range.contains(&v("4.3.4")));
        assert!(range.contains(&v("4.0.0")));
        assert!(!range.contains(&v("5.0.0")));
        assert!(!range.contains(&v("develop")));
    }

    #[test]
    fn test_range_lower_open() {
        let range = r("4:");
        assert!(range.contains(&v("4.0.0")));
        assert!(range.contains(&v("4.3.4")));
        assert!(range.contains(&v("5.0.0")));
        assert!(range.contains(&v("develop")));
        assert!(!range.contains(&v("3.0.0")));
    }

    #[test]
    fn test_range_between() {
        let range = r("3.0:4.3");
        assert!(range.contains(&v("3.0.0")));
        assert!(range.contains(&v("4.3.4"))); // upper bound prefix-matches
        assert!(!range.contains(&v("2.2.2")));
        assert!(!range.contains(&v("5.0.0")));
    }

    #[test]
    fn test_range_invalid() {
        assert!(VersionRange::parse("1:2:3").is_err());
    }

    #[test]
    fn test_range_display() {
        assert_eq!(r(":4").to_string(), ":4");
        assert_eq!(r("=5.0.0").to_string(), "=5.0.0");
        assert_eq!(r("3.0:4.3").to_string(), "3.0:4.3");
    }
}
