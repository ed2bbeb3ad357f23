//! Core data model: the types that flow between Scanner, Parser, and Resolver.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// A source file discovered by the Scanner. Invariants (absolute-or-relative,
/// regular file, size cap, recognized extension) are enforced by the
/// Scanner before a path is ever wrapped here.
pub type FilePath = PathBuf;

/// `(path, size_bytes, mtime_nanoseconds)` — the Parse Cache key.
///
/// Two fingerprints compare equal iff all three fields match; no content
/// hashing is performed (mtime + size is enough for this cache's purpose).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct FileFingerprint {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mtime_nanos: i128,
}

impl FileFingerprint {
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", self.path.display(), self.size_bytes, self.mtime_nanos)
    }
}

/// Disposition of an extracted import, per spec: Typing imports never
/// contribute to dependencies, Runtime and Dynamic both do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportClassification {
    Runtime,
    Typing,
    Dynamic,
}

/// The three disjoint module-name sets produced by parsing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseResult {
    pub runtime: BTreeSet<String>,
    pub typing: BTreeSet<String>,
    pub dynamic: BTreeSet<String>,
}

impl ParseResult {
    /// Runtime and Dynamic names unioned; this is what the Resolver sees.
    pub fn resolvable_names(&self) -> BTreeSet<String> {
        self.runtime.union(&self.dynamic).cloned().collect()
    }
}

/// Extracts the first dot-separated segment of a module path, e.g.
/// `torch.nn.functional` -> `torch`. Only the top-level module participates
/// in resolution.
pub fn top_level_module(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// The canonical name of a package on the remote index: lowercased,
/// underscores replaced with hyphens, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DistributionName(String);

impl DistributionName {
    /// Normalizes an arbitrary candidate string into a `DistributionName`,
    /// returning `None` if it can never be made valid (empty after trim).
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase().replace('_', "-");
        if normalized.is_empty() {
            return None;
        }
        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DistributionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved distribution, optionally carrying an extras list, rendered as
/// `name` or `name[extra1,extra2]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
    pub name: DistributionName,
    pub extras: Vec<String>,
}

impl Dependency {
    pub fn new(name: DistributionName) -> Self {
        Self { name, extras: Vec::new() }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.extras.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.extras.join(","))
        }
    }
}

/// One record in the persistent index cache.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    pub exists: bool,
    pub fetched_at: u64,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.fetched_at) > self.ttl_seconds
    }
}

/// Per-stage wall-clock durations reported by `infer`.
pub type Timings = std::collections::BTreeMap<String, Duration>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_module() {
        assert_eq!(top_level_module("torch.nn.functional"), "torch");
        assert_eq!(top_level_module("os"), "os");
    }

    #[test]
    fn test_fingerprint_equality() {
        let a = FileFingerprint { path: "a.py".into(), size_bytes: 10, mtime_nanos: 5 };
        let b = FileFingerprint { path: "a.py".into(), size_bytes: 10, mtime_nanos: 5 };
        let c = FileFingerprint { path: "a.py".into(), size_bytes: 11, mtime_nanos: 5 };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_distribution_name_normalize() {
        let d = DistributionName::normalize("  PyYAML_extra  ").unwrap();
        assert_eq!(d.as_str(), "pyyaml-extra");
        assert!(DistributionName::normalize("   ").is_none());
    }

    #[test]
    fn test_dependency_display() {
        let d = Dependency::new(DistributionName::normalize("fastapi").unwrap());
        assert_eq!(d.to_string(), "fastapi");
        let mut d2 = d.clone();
        d2.extras.push("uvicorn".into());
        assert_eq!(d2.to_string(), "fastapi[uvicorn]");
    }

    #[test]
    fn test_cache_entry_expiry() {
        let e = CacheEntry { exists: true, fetched_at: 1000, ttl_seconds: 60 };
        assert!(!e.is_expired(1050));
        assert!(e.is_expired(1100));
    }

    #[test]
    fn test_resolvable_names_union() {
        let mut pr = ParseResult::default();
        pr.runtime.insert("requests".into());
        pr.dynamic.insert("redis".into());
        pr.typing.insert("numpy".into());
        let resolvable = pr.resolvable_names();
        assert!(resolvable.contains("requests"));
        assert!(resolvable.contains("redis"));
        assert!(!resolvable.contains("numpy"));
    }
}
