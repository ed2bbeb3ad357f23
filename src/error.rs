//! Error and warning types.
//!
//! Recovered errors (spec's "disposition" table) never travel through
//! `Result` — they are pushed onto a `Vec<Warning>` and returned alongside
//! whatever partial output the pipeline still produced. Only conditions the
//! spec marks "Fatal" become a `DepsleuthError`.

use std::fmt;
use std::path::PathBuf;

/// The kind of a recovered or fatal error, per spec.md §7's disposition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransientIo,
    Absent,
    MalformedInput,
    UnsafeInput,
    CacheCorruption,
    FilesystemPermission,
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TransientIo => "transient_io",
            Self::Absent => "absent",
            Self::MalformedInput => "malformed_input",
            Self::UnsafeInput => "unsafe_input",
            Self::CacheCorruption => "cache_corruption",
            Self::FilesystemPermission => "filesystem_permission",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// A recovered error surfaced to the caller without aborting the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: ErrorKind,
    pub subject: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: ErrorKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, subject: subject.into(), message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.subject, self.message)
    }
}

/// Fatal conditions the core cannot recover from on its own.
#[derive(Debug, thiserror::Error)]
pub enum DepsleuthError {
    #[error("project root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("project root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = Warning::new(ErrorKind::Absent, "redis", "not found on index");
        assert_eq!(w.to_string(), "[absent] redis: not found on index");
    }

    #[test]
    fn test_error_kind_display_all_variants() {
        let kinds = [
            ErrorKind::TransientIo,
            ErrorKind::Absent,
            ErrorKind::MalformedInput,
            ErrorKind::UnsafeInput,
            ErrorKind::CacheCorruption,
            ErrorKind::FilesystemPermission,
            ErrorKind::Fatal,
        ];
        for k in kinds {
            assert!(!k.to_string().is_empty());
        }
    }

    #[test]
    fn test_root_not_found_message() {
        let e = DepsleuthError::RootNotFound(PathBuf::from("/nope"));
        assert!(e.to_string().contains("/nope"));
    }
}
