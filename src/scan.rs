//! Directory traversal: project root -> eligible source file paths.

use crate::options::Options;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const IGNORE_DIR_NAMES: &[&str] = &[
    // virtual environments
    "venv", ".venv", "env", ".env", "virtualenv",
    // package-ecosystem build/cache directories
    "node_modules", "dist", "build", ".tox", ".nox", ".eggs", ".mypy_cache", ".ruff_cache",
    ".pytest_cache",
    // VCS
    ".git", ".hg", ".svn",
    // IDE
    ".idea", ".vscode",
    // tool state
    ".terraform", ".serverless",
];

const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

fn is_ignored_dir_name(name: &str, extra: &HashSet<String>) -> bool {
    IGNORE_DIR_NAMES.contains(&name) || name.ends_with(".egg-info") || extra.contains(name)
}

/// A directory is a virtualenv root if it carries `pyvenv.cfg` or an
/// activation script, regardless of its own name.
fn looks_like_venv_root(dir: &Path) -> bool {
    dir.join("pyvenv.cfg").is_file()
        || dir.join("bin").join("activate").is_file()
        || dir.join("Scripts").join("activate").is_file()
}

fn has_recognized_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else { return false };
    extensions.iter().any(|want| want.trim_start_matches('.') == ext)
}

/// Given a root directory, yields every source file eligible for parsing:
/// gitignore-respecting, symlink-free (file and every ancestor), within the
/// size cap, under a recognized extension, and outside any ignored or
/// virtualenv directory.
pub fn scan(root: &Path, options: &Options) -> Vec<PathBuf> {
    let extra_ignore = options.extra_ignore_dirs.clone();
    let extensions = options.extensions.clone();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .filter_entry(move |entry| {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let name = entry.file_name().to_string_lossy();
                if is_ignored_dir_name(&name, &extra_ignore) {
                    return false;
                }
                if looks_like_venv_root(entry.path()) {
                    return false;
                }
            }
            true
        })
        .build();

    let mut paths = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                if is_eligible_file(&entry, &extensions) {
                    paths.push(entry.into_path());
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable directory entry");
            }
        }
    }
    paths
}

fn is_eligible_file(entry: &ignore::DirEntry, extensions: &HashSet<String>) -> bool {
    if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
        return false;
    }
    let path = entry.path();
    if !has_recognized_extension(path, extensions) {
        return false;
    }
    match std::fs::symlink_metadata(path) {
        Ok(meta) => {
            if meta.file_type().is_symlink() {
                return false;
            }
            if meta.len() > MAX_FILE_SIZE_BYTES {
                tracing::debug!(path = %path.display(), size = meta.len(), "skipping oversized file");
                return false;
            }
            true
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn opts() -> Options {
        Options::default()
    }

    #[test]
    fn test_finds_python_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.py"), "import os").unwrap();
        fs::write(tmp.path().join("b.txt"), "not python").unwrap();
        let found = scan(tmp.path(), &opts());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("a.py"));
    }

    #[test]
    fn test_skips_ignored_dir_names() {
        let tmp = TempDir::new().unwrap();
        let nm = tmp.path().join("node_modules");
        fs::create_dir(&nm).unwrap();
        fs::write(nm.join("x.py"), "import os").unwrap();
        fs::write(tmp.path().join("main.py"), "import os").unwrap();
        let found = scan(tmp.path(), &opts());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("main.py"));
    }

    #[test]
    fn test_skips_venv_by_marker_regardless_of_name() {
        let tmp = TempDir::new().unwrap();
        let odd = tmp.path().join("my_env_dir");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("pyvenv.cfg"), "home = /usr").unwrap();
        fs::write(odd.join("lib.py"), "import os").unwrap();
        fs::write(tmp.path().join("main.py"), "import os").unwrap();
        let found = scan(tmp.path(), &opts());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("main.py"));
    }

    #[test]
    fn test_skips_oversized_file() {
        let tmp = TempDir::new().unwrap();
        let big = vec![b'x'; (MAX_FILE_SIZE_BYTES + 1) as usize];
        fs::write(tmp.path().join("huge.py"), big).unwrap();
        fs::write(tmp.path().join("small.py"), "import os").unwrap();
        let found = scan(tmp.path(), &opts());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("small.py"));
    }

    #[test]
    fn test_skips_symlinked_file() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real.py");
        fs::write(&real, "import os").unwrap();
        let link = tmp.path().join("link.py");
        #[cfg(unix)]
        std::os::unix::fs::symlink(&real, &link).unwrap();
        #[cfg(unix)]
        {
            let found = scan(tmp.path(), &opts());
            assert_eq!(found.len(), 1);
            assert!(found[0].ends_with("real.py"));
        }
    }

    #[test]
    fn test_extra_ignore_dirs() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("scratch");
        fs::create_dir(&custom).unwrap();
        fs::write(custom.join("x.py"), "import os").unwrap();
        fs::write(tmp.path().join("main.py"), "import os").unwrap();
        let mut o = opts();
        o.extra_ignore_dirs.insert("scratch".to_string());
        let found = scan(tmp.path(), &o);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("main.py"));
    }
}
