//! Parse Cache: `FileFingerprint -> ParseResult`, so re-running `infer` on
//! an unchanged tree skips the syntax parser entirely (spec.md §4.5).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Warning;
use crate::persist_cache::{self, CacheValue};
use crate::types::{FileFingerprint, ParseResult};

impl CacheValue for ParseResult {
    fn is_valid(&self) -> bool {
        true
    }
}

pub struct ParseCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, ParseResult>>,
}

impl ParseCache {
    /// Returns the loaded cache plus any `CacheCorruption` warnings produced
    /// while reading it, so the caller can fold them into `InferOutput`
    /// instead of the reset happening silently (spec.md §7).
    pub fn load(cache_dir: &Path) -> (Self, Vec<Warning>) {
        let path = cache_dir.join("parse.json");
        let (entries, warnings) = persist_cache::load(&path);
        (Self { path, entries: Mutex::new(entries) }, warnings)
    }

    pub fn get(&self, fingerprint: &FileFingerprint) -> Option<ParseResult> {
        self.entries.lock().expect("parse cache mutex poisoned").get(&fingerprint.cache_key()).cloned()
    }

    pub fn put(&self, fingerprint: &FileFingerprint, result: ParseResult) {
        self.entries
            .lock()
            .expect("parse cache mutex poisoned")
            .insert(fingerprint.cache_key(), result);
    }

    /// Persists the cache unless the run was cancelled (spec.md §5:
    /// "cache writes are skipped on cancel to avoid persisting partial
    /// data").
    pub fn save_unless_cancelled(&self, cancelled: bool) -> std::io::Result<()> {
        if cancelled {
            return Ok(());
        }
        let entries = self.entries.lock().expect("parse cache mutex poisoned");
        persist_cache::save(&self.path, &entries)
    }
}

pub fn fingerprint_for(path: &Path) -> std::io::Result<FileFingerprint> {
    let metadata = std::fs::metadata(path)?;
    let mtime_nanos = metadata
        .modified()?
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as i128)
        .unwrap_or(0);
    Ok(FileFingerprint { path: path.to_path_buf(), size_bytes: metadata.len(), mtime_nanos })
}
