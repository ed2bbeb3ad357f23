//! The atomic-write/version-checked JSON persistence shared by the Index
//! Client's package cache and the Parse Cache. Both caches hold an
//! in-memory `Mutex<HashMap<...>>` during a run and are written to disk
//! once, at the end, if the run wasn't cancelled.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ErrorKind, Warning};

const CURRENT_VERSION: u32 = 1;

#[derive(serde::Deserialize)]
struct OnDisk<V> {
    version: u32,
    entries: HashMap<String, V>,
}

#[derive(serde::Serialize)]
struct OnDiskRef<'a, V> {
    version: u32,
    entries: &'a HashMap<String, V>,
}

/// Loads a cache file, validating each entry independently. A whole-file
/// parse failure or version mismatch resets to an empty map rather than
/// failing the caller, and surfaces an `ErrorKind::CacheCorruption` warning
/// for each reset or dropped entry rather than only logging it (spec.md §7's
/// "cache corruption -> reset that cache to empty; continue" disposition
/// still applies, but the reset is no longer silent to the caller).
pub fn load<V>(path: &Path) -> (HashMap<String, V>, Vec<Warning>)
where
    V: DeserializeOwned + CacheValue,
{
    let mut warnings = Vec::new();
    let Ok(contents) = std::fs::read_to_string(path) else { return (HashMap::new(), warnings) };
    let parsed: Result<OnDisk<serde_json::Value>, _> = serde_json::from_str(&contents);
    let Ok(on_disk) = parsed else {
        tracing::warn!(path = %path.display(), "cache file is corrupt JSON; resetting to empty");
        warnings.push(Warning::new(
            ErrorKind::CacheCorruption,
            path.display().to_string(),
            "cache file is corrupt JSON; reset to empty",
        ));
        return (HashMap::new(), warnings);
    };
    if on_disk.version != CURRENT_VERSION {
        tracing::warn!(path = %path.display(), version = on_disk.version, "cache schema version mismatch; resetting to empty");
        warnings.push(Warning::new(
            ErrorKind::CacheCorruption,
            path.display().to_string(),
            format!("cache schema version {} does not match current version {CURRENT_VERSION}; reset to empty", on_disk.version),
        ));
        return (HashMap::new(), warnings);
    }
    let mut entries = HashMap::new();
    for (key, raw) in on_disk.entries {
        match serde_json::from_value::<V>(raw) {
            Ok(value) if value.is_valid() => {
                entries.insert(key, value);
            }
            Ok(_) => {
                tracing::debug!(key, "dropping cache entry that failed validation");
                warnings.push(Warning::new(ErrorKind::CacheCorruption, key, "cache entry failed validation; dropped"));
            }
            Err(_) => {
                tracing::debug!(key, "dropping cache entry with wrong-typed fields");
                warnings.push(Warning::new(ErrorKind::CacheCorruption, key, "cache entry had wrong-typed fields; dropped"));
            }
        }
    }
    (entries, warnings)
}

/// Writes the cache atomically: serialize to a temp file in the same
/// directory, then rename over the destination. Owner-only permissions are
/// applied on POSIX, matching the index cache's confidentiality
/// requirement (host identities may leak through package names).
pub fn save<V>(path: &Path, entries: &HashMap<String, V>) -> std::io::Result<()>
where
    V: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let on_disk = OnDiskRef { version: CURRENT_VERSION, entries };
    let serialized = serde_json::to_string_pretty(&on_disk).map_err(std::io::Error::other)?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
    }
    set_owner_only_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// A cache value that can validate its own fields after deserialization,
/// independent of serde's type-level checks (e.g. a negative TTL).
pub trait CacheValue {
    fn is_valid(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Dummy {
        n: i64,
    }
    impl CacheValue for Dummy {
        fn is_valid(&self) -> bool {
            self.n >= 0
        }
    }

    #[test]
    fn test_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), Dummy { n: 1 });
        entries.insert("b".to_string(), Dummy { n: 2 });
        save(&path, &entries).unwrap();
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert_eq!(loaded, entries);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.json");
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert!(loaded.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_corrupt_json_resets_to_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert!(loaded.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::CacheCorruption);
    }

    #[test]
    fn test_version_mismatch_resets_to_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, r#"{"version": 999, "entries": {"a": {"n": 1}}}"#).unwrap();
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert!(loaded.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::CacheCorruption);
    }

    #[test]
    fn test_invalid_entry_dropped_individually() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "entries": {"good": {"n": 1}, "bad": {"n": -5}}}"#,
        )
        .unwrap();
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("good"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::CacheCorruption);
        assert_eq!(warnings[0].subject, "bad");
    }

    #[test]
    fn test_wrong_typed_entry_dropped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, r#"{"version": 1, "entries": {"bad": {"n": "not a number"}}}"#).unwrap();
        let (loaded, warnings): (HashMap<String, Dummy>, Vec<Warning>) = load(&path);
        assert!(loaded.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::CacheCorruption);
    }
}
