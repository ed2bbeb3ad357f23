//! Index Client: the sole remote dependency. Wraps the package index's JSON
//! metadata endpoint with an in-memory + persistent two-level cache
//! (spec.md §4.4).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Warning;
use crate::persist_cache::{self, CacheValue};
use crate::types::CacheEntry;
use crate::validators::is_url_safe;

const RESPONSE_SIZE_LIMIT_BYTES: u64 = 5 * 1024 * 1024;
const TTL_EXISTS_SECS: u64 = 7 * 24 * 60 * 60;
const TTL_ABSENT_SECS: u64 = 60 * 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 2;

impl CacheValue for CacheEntry {
    fn is_valid(&self) -> bool {
        self.ttl_seconds > 0
    }
}

/// Metadata record returned by a successful `metadata()` lookup; only the
/// fields the cascade and extras table need are kept.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PackageMetadata {
    pub info: PackageInfo,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}

pub struct IndexClient {
    base_url: String,
    http: reqwest::blocking::Client,
    cache_path: PathBuf,
    cache: Mutex<HashMap<String, CacheEntry>>,
    offline: bool,
}

impl IndexClient {
    /// Returns the client plus any `CacheCorruption` warnings produced while
    /// loading its persistent cache (spec.md §7).
    pub fn new(cache_dir: &Path, offline: bool) -> (Self, Vec<Warning>) {
        let cache_path = cache_dir.join("cache.json");
        let (cache, warnings) = persist_cache::load(&cache_path);
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(concat!("depsleuth/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client with static config always builds");
        let client = Self {
            base_url: "https://pypi.org".to_string(),
            http,
            cache_path,
            cache: Mutex::new(cache),
            offline,
        };
        (client, warnings)
    }

    #[cfg(test)]
    fn with_base_url(cache_dir: &Path, base_url: String, offline: bool) -> Self {
        let (mut client, _) = Self::new(cache_dir, offline);
        client.base_url = base_url;
        client
    }

    fn now_secs() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
    }

    fn cached_exists(&self, name: &str) -> Option<bool> {
        let cache = self.cache.lock().expect("index cache mutex poisoned");
        let entry = cache.get(name)?;
        if entry.is_expired(Self::now_secs()) {
            return None;
        }
        Some(entry.exists)
    }

    fn record(&self, name: &str, exists: bool) {
        let ttl = if exists { TTL_EXISTS_SECS } else { TTL_ABSENT_SECS };
        let entry = CacheEntry { exists, fetched_at: Self::now_secs(), ttl_seconds: ttl };
        self.cache.lock().expect("index cache mutex poisoned").insert(name.to_string(), entry);
    }

    /// `exists(name) -> bool`, collapsing `exists_checked`'s disposition down
    /// to a plain boolean for callers (like `metadata`) that don't need to
    /// distinguish *why* a lookup failed.
    pub fn exists(&self, name: &str) -> bool {
        matches!(self.exists_checked(name), LookupOutcome::Exists)
    }

    /// Validates `name` before it ever reaches URL construction (defense in
    /// depth, even for names already confirmed safe by an upstream validator
    /// call), then checks the cache before ever touching the network.
    /// Distinguishes validator rejection, a confirmed answer, and retry
    /// exhaustion so the caller can attribute the right `ErrorKind`.
    pub fn exists_checked(&self, name: &str) -> LookupOutcome {
        let (safe, reason) = is_url_safe(name);
        if !safe {
            return LookupOutcome::Rejected(reason.unwrap_or_else(|| "name failed URL-safety validation".to_string()));
        }
        if let Some(cached) = self.cached_exists(name) {
            return if cached { LookupOutcome::Exists } else { LookupOutcome::Absent };
        }
        if self.offline {
            return LookupOutcome::Absent;
        }
        match self.fetch_with_retries(name) {
            Some(exists) => {
                self.record(name, exists);
                if exists { LookupOutcome::Exists } else { LookupOutcome::Absent }
            }
            None => LookupOutcome::TransientFailure,
        }
    }

    fn fetch_with_retries(&self, name: &str) -> Option<bool> {
        for attempt in 0..=MAX_RETRIES {
            match self.fetch_once(name) {
                FetchOutcome::Exists => return Some(true),
                FetchOutcome::Absent => return Some(false),
                FetchOutcome::Transient => {
                    tracing::warn!(name, attempt, "transient index lookup failure, retrying");
                }
            }
        }
        tracing::warn!(name, "index lookup unknown after retries; treating as absent");
        None
    }

    fn fetch_once(&self, name: &str) -> FetchOutcome {
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        let response = match self.http.get(&url).send() {
            Ok(r) => r,
            Err(_) => return FetchOutcome::Transient,
        };
        match response.status().as_u16() {
            200 => {
                if response.content_length().is_some_and(|len| len > RESPONSE_SIZE_LIMIT_BYTES) {
                    return FetchOutcome::Absent;
                }
                match response.text() {
                    Ok(body) if body.len() as u64 <= RESPONSE_SIZE_LIMIT_BYTES => FetchOutcome::Exists,
                    _ => FetchOutcome::Absent,
                }
            }
            404 => FetchOutcome::Absent,
            _ => FetchOutcome::Transient,
        }
    }

    /// Full metadata, used only where the caller needs version/extras
    /// beyond a plain existence check. Shares `exists`'s caching for the
    /// boolean but always performs a live fetch for the record itself
    /// (metadata isn't persisted, only existence is, per spec.md §4.4).
    pub fn metadata(&self, name: &str) -> Option<PackageMetadata> {
        if self.offline || !self.exists(name) {
            return None;
        }
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        let response = self.http.get(&url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().ok()
    }

    pub fn latest_version(&self, name: &str) -> Option<String> {
        self.metadata(name).map(|m| m.info.version)
    }

    pub fn save_unless_cancelled(&self, cancelled: bool) -> std::io::Result<()> {
        if cancelled {
            return Ok(());
        }
        let cache = self.cache.lock().expect("index cache mutex poisoned");
        persist_cache::save(&self.cache_path, &cache)
    }
}

enum FetchOutcome {
    Exists,
    Absent,
    Transient,
}

/// The disposition of one `exists_checked` call, precise enough for the
/// caller to attribute the correct `ErrorKind` (spec.md §7) instead of
/// collapsing every non-`Exists` outcome to "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Exists,
    Absent,
    /// The name never reached the network; carries the validator's reason.
    Rejected(String),
    /// Retries were exhausted without a definitive answer.
    TransientFailure,
}
