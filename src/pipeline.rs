//! Public core API: `scan`, `parse_many`, `resolve`, `infer`. The CLI (and
//! any other caller) only ever talks to this module.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{DepsleuthError, Warning};
use crate::index_client::IndexClient;
use crate::options::Options;
use crate::parse_cache::{fingerprint_for, ParseCache};
use crate::parser::{create_parser, parse_path};
use crate::resolver::resolve as resolve_cascade;
use crate::scan::scan as scan_tree;
use crate::types::{Dependency, ParseResult, Timings};

pub fn scan(root: &Path, options: &Options) -> Vec<PathBuf> {
    scan_tree(root, options)
}

/// Parses every path, consulting and populating the Parse Cache. Each
/// parse-pool worker owns its own `tree_sitter::Parser` (tree-sitter
/// parsers are not `Sync`), so parallelism is across files only.
pub fn parse_many(
    paths: &[PathBuf],
    options: &Options,
    cache: &ParseCache,
    cancelled: &AtomicBool,
) -> (HashMap<PathBuf, ParseResult>, Vec<Warning>) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.parse_workers.max(1))
        .build()
        .expect("parse pool with a positive thread count always builds");

    let per_file: Vec<(PathBuf, ParseResult, Vec<Warning>)> = pool.install(|| {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map_init(create_parser, |parser, path| parse_one_cached(parser, path, cache, cancelled))
            .collect()
    });

    let mut results = HashMap::new();
    let mut warnings = Vec::new();
    for (path, result, file_warnings) in per_file {
        results.insert(path, result);
        warnings.extend(file_warnings);
    }
    (results, warnings)
}

fn parse_one_cached(
    parser: &mut tree_sitter::Parser,
    path: &Path,
    cache: &ParseCache,
    cancelled: &AtomicBool,
) -> (PathBuf, ParseResult, Vec<Warning>) {
    if cancelled.load(Ordering::Relaxed) {
        return (path.to_path_buf(), ParseResult::default(), Vec::new());
    }
    let fingerprint = match fingerprint_for(path) {
        Ok(fp) => fp,
        Err(err) => {
            return (
                path.to_path_buf(),
                ParseResult::default(),
                vec![Warning::new(crate::error::ErrorKind::FilesystemPermission, path.display().to_string(), err.to_string())],
            );
        }
    };
    if let Some(cached) = cache.get(&fingerprint) {
        return (path.to_path_buf(), cached, Vec::new());
    }
    let (result, warnings) = parse_path(parser, path);
    cache.put(&fingerprint, result.clone());
    (path.to_path_buf(), result, warnings)
}

pub struct ResolveOutput {
    pub resolved: Vec<Dependency>,
    pub unresolved: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn resolve(
    module_names: &std::collections::BTreeSet<String>,
    project_root: &Path,
    options: &Options,
    index: &IndexClient,
) -> ResolveOutput {
    let outcome = resolve_cascade(module_names, project_root, options, index);
    ResolveOutput {
        resolved: outcome.resolved,
        unresolved: outcome.unresolved,
        warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
    }
}

pub struct InferOutput {
    pub dependencies: Vec<Dependency>,
    pub unresolved: Vec<String>,
    pub warnings: Vec<String>,
    pub timings: Timings,
}

/// The single synchronous entry point: blocks until Scan -> Parse ->
/// Resolve have all drained, then returns. `cancelled` is checked between
/// stages and by parse-pool workers; on cancellation, cache writes are
/// skipped so no partial state is persisted (spec.md §5).
pub fn infer(root: &Path, options: &Options, cancelled: Arc<AtomicBool>) -> Result<InferOutput, DepsleuthError> {
    if !root.exists() {
        return Err(DepsleuthError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DepsleuthError::RootNotADirectory(root.to_path_buf()));
    }

    let mut timings = Timings::new();
    let mut all_warnings: Vec<Warning> = Vec::new();

    let scan_start = Instant::now();
    let paths = scan(root, options);
    timings.insert("scan".to_string(), scan_start.elapsed());

    let (parse_cache, parse_cache_warnings) = ParseCache::load(&options.cache_dir);
    all_warnings.extend(parse_cache_warnings);
    let parse_start = Instant::now();
    let (parsed, parse_warnings) = parse_many(&paths, options, &parse_cache, &cancelled);
    all_warnings.extend(parse_warnings);
    timings.insert("parse".to_string(), parse_start.elapsed());
    parse_cache.save_unless_cancelled(cancelled.load(Ordering::Relaxed)).ok();

    let mut module_names = std::collections::BTreeSet::new();
    for result in parsed.values() {
        module_names.extend(result.resolvable_names());
    }

    let (index, index_cache_warnings) =
        IndexClient::new(&options.cache_dir, options.offline || cancelled.load(Ordering::Relaxed));
    all_warnings.extend(index_cache_warnings);
    let resolve_start = Instant::now();
    let outcome = resolve_cascade(&module_names, root, options, &index);
    timings.insert("resolve".to_string(), resolve_start.elapsed());
    index.save_unless_cancelled(cancelled.load(Ordering::Relaxed)).ok();

    all_warnings.extend(outcome.warnings);

    Ok(InferOutput {
        dependencies: outcome.resolved,
        unresolved: outcome.unresolved,
        warnings: all_warnings.iter().map(ToString::to_string).collect(),
        timings,
    })
}

/// Convenience wrapper used by tests and simple callers that don't need
/// cooperative cancellation.
pub fn infer_uncancellable(root: &Path, options: &Options) -> Result<InferOutput, DepsleuthError> {
    infer(root, options, Arc::new(AtomicBool::new(false)))
}

/// Renders timings as a stable-ordered map for JSON output.
pub fn timings_as_millis(timings: &Timings) -> BTreeMap<String, f64> {
    timings.iter().map(|(k, v)| (k.clone(), v.as_secs_f64() * 1000.0)).collect()
}
