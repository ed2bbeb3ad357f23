//! Resolver: candidate module names -> a sorted, deduplicated dependency
//! list, via the ordered cascade in spec.md §4.3.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{ErrorKind, Warning};
use crate::index_client::{IndexClient, LookupOutcome};
use crate::mappings::{framework_extras_for, is_in_bundled_index, static_mapping_lookup};
use crate::options::Options;
use crate::stdlib::{is_stdlib, SUSPICIOUS_NAMES};
use crate::types::{Dependency, DistributionName};

pub struct ResolveOutcome {
    pub resolved: Vec<Dependency>,
    pub unresolved: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Outcome of pushing one module name through the static cascade, before
/// dedup/sort/extras are applied.
enum CascadeResult {
    Dropped,
    Mapped(String),
}

/// Outcome of pushing one module name's spelling variants through the
/// remote lookup, precise enough to attribute the right `ErrorKind`
/// (spec.md §7) instead of collapsing every non-match to "absent".
enum RemoteOutcome {
    Mapped(String),
    Unresolved,
    /// A variant was rejected by the Index Client's own validator; carries
    /// its reason.
    Rejected(String),
    /// At least one variant exhausted its retries without a definitive
    /// answer, and no other variant resolved.
    Transient,
}

/// Scans the project root non-recursively for local module/package names:
/// top-level `.py` files (minus extension) and directories containing a
/// package-init file. This is the set the local-module filter drops.
pub fn local_module_names(project_root: &Path, extensions: &HashSet<String>) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Ok(entries) = std::fs::read_dir(project_root) else { return names };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let has_recognized_ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| extensions.iter().any(|w| w.trim_start_matches('.') == ext));
                if has_recognized_ext {
                    names.insert(stem.to_string());
                }
            }
        } else if path.is_dir() {
            let has_init = path.join("__init__.py").is_file();
            if has_init {
                if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
                    names.insert(dir_name.to_string());
                }
            }
        }
    }
    names
}

fn cascade_static(name: &str, local_names: &BTreeSet<String>, warnings: &mut Vec<Warning>) -> Option<CascadeResult> {
    if local_names.contains(name) {
        return Some(CascadeResult::Dropped);
    }
    if is_stdlib(name) {
        return Some(CascadeResult::Dropped);
    }
    if SUSPICIOUS_NAMES.contains(&name) {
        tracing::debug!(module = name, "dropping suspicious generic-looking module name");
        warnings.push(Warning::new(ErrorKind::MalformedInput, name, "dropped by suspicious-name heuristic"));
        return Some(CascadeResult::Dropped);
    }
    if let Some(mapped) = static_mapping_lookup(name) {
        return Some(CascadeResult::Mapped(mapped.to_string()));
    }
    let normalized = name.to_lowercase().replace('_', "-");
    if is_in_bundled_index(&normalized) {
        return Some(CascadeResult::Mapped(normalized));
    }
    None
}

fn spelling_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    if name.contains('_') {
        variants.push(name.replace('_', "-"));
    }
    if name.contains('-') {
        variants.push(name.replace('-', "_"));
    }
    variants.push(format!("python-{name}"));
    variants.push(format!("py-{name}"));
    variants.dedup();
    variants
}

fn remote_lookup(name: &str, index: &IndexClient) -> RemoteOutcome {
    let mut saw_transient = false;
    for variant in spelling_variants(name) {
        match index.exists_checked(&variant) {
            LookupOutcome::Exists => return RemoteOutcome::Mapped(variant),
            LookupOutcome::Absent => {}
            LookupOutcome::Rejected(reason) => return RemoteOutcome::Rejected(reason),
            LookupOutcome::TransientFailure => saw_transient = true,
        }
    }
    if saw_transient { RemoteOutcome::Transient } else { RemoteOutcome::Unresolved }
}

/// Given a set of candidate top-level module names and the project root,
/// returns the sorted list of dependencies plus unresolved names and
/// warnings. Network lookups for names that survive the static cascade are
/// dispatched to a bounded worker pool; no partial results are observable
/// before every worker completes (spec.md §4.3, §5).
pub fn resolve(
    module_names: &BTreeSet<String>,
    project_root: &Path,
    options: &Options,
    index: &IndexClient,
) -> ResolveOutcome {
    let local_names = local_module_names(project_root, &options.extensions);

    let mut mapped: Vec<(String, String)> = Vec::new();
    let mut needs_remote: Vec<String> = Vec::new();
    let mut warnings = Vec::new();

    for name in module_names {
        match cascade_static(name, &local_names, &mut warnings) {
            Some(CascadeResult::Dropped) => {}
            Some(CascadeResult::Mapped(dist)) => mapped.push((name.clone(), dist)),
            None => needs_remote.push(name.clone()),
        }
    }

    if options.offline {
        for name in &needs_remote {
            warnings.push(Warning::new(ErrorKind::Absent, name.as_str(), "offline mode: no remote lookup performed"));
        }
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.lookup_workers_clamped())
            .build()
            .expect("lookup pool with a positive thread count always builds");
        let remote_results: Vec<(String, RemoteOutcome)> = pool.install(|| {
            use rayon::prelude::*;
            needs_remote
                .par_iter()
                .map(|name| (name.clone(), remote_lookup(name, index)))
                .collect()
        });
        for (name, outcome) in remote_results {
            match outcome {
                RemoteOutcome::Mapped(dist) => mapped.push((name, dist)),
                RemoteOutcome::Unresolved => {
                    warnings.push(Warning::new(ErrorKind::Absent, name.as_str(), "no spelling variant exists on the index"));
                }
                RemoteOutcome::Rejected(reason) => {
                    warnings.push(Warning::new(ErrorKind::UnsafeInput, name.as_str(), reason));
                }
                RemoteOutcome::Transient => {
                    warnings.push(Warning::new(
                        ErrorKind::TransientIo,
                        name.as_str(),
                        "index lookup failed after exhausting retries; treated as unknown",
                    ));
                }
            }
        }
    }

    let unresolved: Vec<String> =
        needs_remote.iter().filter(|n| !mapped.iter().any(|(src, _)| src == *n)).cloned().collect();

    let mut dependencies: Vec<Dependency> = Vec::new();
    let mut seen_distribution_names: HashSet<String> = HashSet::new();
    for (_, distribution) in &mapped {
        let Some(normalized) = DistributionName::normalize(distribution) else { continue };
        if seen_distribution_names.insert(normalized.as_str().to_string()) {
            dependencies.push(Dependency::new(normalized));
        }
    }

    apply_framework_extras(&mut dependencies, &mut seen_distribution_names);

    dependencies.sort();
    let mut unresolved_sorted = unresolved;
    unresolved_sorted.sort();

    ResolveOutcome { resolved: dependencies, unresolved: unresolved_sorted, warnings }
}

fn apply_framework_extras(dependencies: &mut Vec<Dependency>, seen: &mut HashSet<String>) {
    let primaries: Vec<String> = dependencies.iter().map(|d| d.name.as_str().to_string()).collect();
    for primary in primaries {
        let Some(extras) = framework_extras_for(&primary) else { continue };
        for extra in extras {
            let Some(normalized) = DistributionName::normalize(extra) else { continue };
            if seen.insert(normalized.as_str().to_string()) {
                dependencies.push(Dependency::new(normalized));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn offline_options() -> Options {
        let mut o = Options::default();
        o.offline = true;
        o
    }

    #[test]
    fn test_stdlib_never_resolved() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("os".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert!(outcome.resolved.is_empty());
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_local_module_filtered() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("utils_pkg")).unwrap();
        std::fs::write(tmp.path().join("utils_pkg").join("__init__.py"), "").unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("utils_pkg".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert!(outcome.resolved.is_empty());
    }

    #[test]
    fn test_suspicious_name_dropped_after_local_filter() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("utils".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert!(outcome.resolved.is_empty());
        assert!(outcome.warnings.iter().any(|w| w.subject == "utils"));
    }

    #[test]
    fn test_static_mapping_applied() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("cv2".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.resolved[0].name.as_str(), "opencv-python");
    }

    #[test]
    fn test_bundled_index_applied() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("requests".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.resolved[0].name.as_str(), "requests");
    }

    #[test]
    fn test_offline_unmapped_name_stays_unresolved() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("some_totally_unknown_module_xyz".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.unresolved, vec!["some_totally_unknown_module_xyz".to_string()]);
    }

    #[test]
    fn test_framework_extras_added_as_peers() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("fastapi".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        let dist_names: Vec<&str> = outcome.resolved.iter().map(|d| d.name.as_str()).collect();
        assert!(dist_names.contains(&"fastapi"));
        assert!(dist_names.contains(&"uvicorn"));
    }

    #[test]
    fn test_dedup_and_sort() {
        let tmp = TempDir::new().unwrap();
        let (index, _) = IndexClient::new(tmp.path(), true);
        let mut names = BTreeSet::new();
        names.insert("requests".to_string());
        names.insert("numpy".to_string());
        let outcome = resolve(&names, tmp.path(), &offline_options(), &index);
        let dist_names: Vec<&str> = outcome.resolved.iter().map(|d| d.name.as_str()).collect();
        let mut sorted = dist_names.clone();
        sorted.sort();
        assert_eq!(dist_names, sorted);
    }

    #[test]
    fn test_spelling_variants_include_hyphen_and_underscore() {
        let variants = spelling_variants("py_yaml");
        assert!(variants.contains(&"py-yaml".to_string()));
        assert!(variants.contains(&"python-py_yaml".to_string()));
    }
}
