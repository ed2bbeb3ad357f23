//! Pure, side-effect-free validators guarding the two trust boundaries where
//! an attacker-influenced string could otherwise reach the network or a
//! shell: URL construction and installer invocation. Applied even to names
//! that originate from the built-in static tables (defense in depth).

use std::sync::LazyLock;

use regex::Regex;

static URL_SAFE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,198}[A-Za-z0-9]$").expect("valid regex"));

static PEP508_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("valid regex"));

const URL_FORBIDDEN_SUBSTRINGS: &[&str] = &["/", "?", "#", "&", "=", "..", "%"];
const SHELL_FORBIDDEN_CHARS: &[char] =
    &[';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', '\n', '\r'];

/// Must hold before a name is interpolated into an Index Client URL.
/// Rejected names never reach the network.
pub fn is_url_safe(name: &str) -> (bool, Option<String>) {
    if !URL_SAFE_RE.is_match(name) {
        return (false, Some(format!("{name:?} does not match the URL-safe name pattern")));
    }
    for forbidden in URL_FORBIDDEN_SUBSTRINGS {
        if name.contains(forbidden) {
            return (false, Some(format!("{name:?} contains forbidden substring {forbidden:?}")));
        }
    }
    (true, None)
}

/// Must hold before a name is passed to an installer subprocess. Rejected
/// names are reported to the caller; the installer is never invoked on them.
pub fn is_shell_safe(name: &str) -> (bool, Option<String>) {
    if !PEP508_RE.is_match(name) {
        return (false, Some(format!("{name:?} does not match the PEP 508 distribution-name grammar")));
    }
    if name.chars().any(char::is_whitespace) {
        return (false, Some(format!("{name:?} contains whitespace")));
    }
    for forbidden in SHELL_FORBIDDEN_CHARS {
        if name.contains(*forbidden) {
            return (false, Some(format!("{name:?} contains shell metacharacter {forbidden:?}")));
        }
    }
    (true, None)
}
