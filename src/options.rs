//! The `Options` struct threaded through every public entry point.

use std::collections::HashSet;
use std::path::PathBuf;

/// Knobs recognized by `scan`, `parse_many`, `resolve`, and `infer`.
#[derive(Debug, Clone)]
pub struct Options {
    pub verbose: bool,
    /// Skip network lookups; unresolved names stay unresolved rather than
    /// reaching the Index Client.
    pub offline: bool,
    pub cache_dir: PathBuf,
    pub lookup_workers: usize,
    pub parse_workers: usize,
    pub extensions: HashSet<String>,
    pub extra_ignore_dirs: HashSet<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbose: false,
            offline: false,
            cache_dir: default_cache_dir(),
            lookup_workers: 64,
            parse_workers: default_parse_workers(),
            extensions: [".py", ".ipynb"].iter().map(|s| (*s).to_string()).collect(),
            extra_ignore_dirs: HashSet::new(),
        }
    }
}

/// `{user_cache_dir}/depsleuth`, honoring `HOME`/`XDG_CACHE_HOME`/platform
/// equivalents via the `dirs` crate, falling back to a temp directory if the
/// platform cache directory cannot be determined.
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("depsleuth")
}

fn default_parse_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4).min(32)
}

impl Options {
    pub fn lookup_workers_clamped(&self) -> usize {
        self.lookup_workers.clamp(50, 128)
    }
}
