//! DSN (data source name) detection inside string literals.
//!
//! A DSN contributes a driver-module hint to the Runtime set: the
//! sub-scheme after `+` if present, else a conservative scheme default.
//! Unknown schemes inside an otherwise-matching DSN are surfaced as
//! warnings rather than guessed (open question in spec.md §9).

use crate::error::{ErrorKind, Warning};
use regex::Regex;
use std::sync::LazyLock;

static DSN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(postgresql|postgres|mysql|sqlite|mongodb|redis|oracle|mssql)(\+([a-z_]+))?://")
        .expect("static DSN regex is valid")
});

/// Conservative scheme -> default driver module mapping, per spec.md §9.
fn default_driver_for_scheme(scheme: &str) -> Option<&'static str> {
    match scheme.to_lowercase().as_str() {
        "postgresql" | "postgres" => Some("psycopg2"),
        "mysql" => Some("pymysql"),
        "sqlite" => None, // sqlite3 is stdlib; no third-party driver implied
        "mongodb" => Some("pymongo"),
        "redis" => Some("redis"),
        "oracle" => Some("cx_Oracle"),
        "mssql" => Some("pyodbc"),
        _ => None,
    }
}

/// Scans a string literal's contents for a DSN prefix. Returns the driver
/// module hint, if any, plus a warning when the scheme matched but no
/// conservative default driver is known for it.
pub fn detect_driver_hint(literal: &str) -> (Option<String>, Option<Warning>) {
    let Some(caps) = DSN_RE.captures(literal) else { return (None, None) };
    let scheme = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    if let Some(sub) = caps.get(3) {
        return (Some(sub.as_str().to_string()), None);
    }
    match default_driver_for_scheme(scheme) {
        Some(driver) => (Some(driver.to_string()), None),
        None if scheme.eq_ignore_ascii_case("sqlite") => (None, None),
        None => (
            None,
            Some(Warning::new(
                ErrorKind::MalformedInput,
                scheme.to_string(),
                "DSN scheme has no known default driver",
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_sub_driver() {
        let (driver, warn) = detect_driver_hint("postgresql+asyncpg://u:p@h/db");
        assert_eq!(driver.as_deref(), Some("asyncpg"));
        assert!(warn.is_none());
    }

    #[test]
    fn test_scheme_default() {
        let (driver, warn) = detect_driver_hint("mysql://u:p@h/db");
        assert_eq!(driver.as_deref(), Some("pymysql"));
        assert!(warn.is_none());
    }

    #[test]
    fn test_sqlite_has_no_driver() {
        let (driver, warn) = detect_driver_hint("sqlite:///local.db");
        assert!(driver.is_none());
        assert!(warn.is_none());
    }

    #[test]
    fn test_non_dsn_string_ignored() {
        let (driver, warn) = detect_driver_hint("just a regular string");
        assert!(driver.is_none());
        assert!(warn.is_none());
    }
}
