//! Two compile-time constant tables used early in the Resolver cascade:
//! the standard-library module set and the suspicious generic-name set.
//!
//! Exposed as `pub const` slices (not behind a loader) so the test suite can
//! assert their contents directly, per spec.md §9.

/// Frozen standard-library module names, historical coverage across 3.x.
/// Only the top-level module matters for resolution, so submodules like
/// `os.path` are not listed separately.
pub const STDLIB_MODULES: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio",
    "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "binhex", "bisect", "builtins",
    "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs", "codeop",
    "collections", "colorsys", "compileall", "concurrent", "configparser", "contextlib",
    "contextvars", "copy", "copyreg", "cProfile", "crypt", "csv", "ctypes", "curses",
    "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis", "distutils", "doctest",
    "email", "encodings", "ensurepip", "enum", "errno", "faulthandler", "fcntl", "filecmp",
    "fileinput", "fnmatch", "fractions", "ftplib", "functools", "gc", "getopt", "getpass",
    "gettext", "glob", "graphlib", "grp", "gzip", "hashlib", "heapq", "hmac", "html", "http",
    "idlelib", "imaplib", "imghdr", "imp", "importlib", "inspect", "io", "ipaddress",
    "itertools", "json", "keyword", "lib2to3", "linecache", "locale", "logging", "lzma",
    "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap", "modulefinder",
    "multiprocessing", "netrc", "nis", "nntplib", "numbers", "operator", "optparse", "os",
    "ossaudiodev", "pathlib", "pdb", "pickle", "pickletools", "pipes", "pkgutil", "platform",
    "plistlib", "poplib", "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd",
    "py_compile", "pyclbr", "pydoc", "queue", "quopri", "random", "re", "readline", "reprlib",
    "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors", "shelve",
    "shlex", "shutil", "signal", "site", "smtpd", "smtplib", "sndhdr", "socket", "socketserver",
    "spwd", "sqlite3", "ssl", "stat", "statistics", "string", "stringprep", "struct",
    "subprocess", "sunau", "symtable", "sys", "sysconfig", "syslog", "tabnanny", "tarfile",
    "telnetlib", "tempfile", "termios", "test", "textwrap", "threading", "time", "timeit",
    "tkinter", "token", "tokenize", "tomllib", "trace", "traceback", "tracemalloc", "tty",
    "turtle", "turtledemo", "types", "typing", "unicodedata", "unittest", "urllib", "uu",
    "uuid", "venv", "warnings", "wave", "weakref", "webbrowser", "winreg", "winsound",
    "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib", "zoneinfo",
];

pub fn is_stdlib(top_level_module: &str) -> bool {
    STDLIB_MODULES.contains(&top_level_module)
}

/// Generic names overwhelmingly used for local application code, applied
/// only after the local-module filter as a fallback heuristic (spec.md
/// §4.3, §9's open question on false negatives).
pub const SUSPICIOUS_NAMES: &[&str] = &[
    "app", "apps", "config", "conf", "settings", "utils", "util", "helpers", "helper",
    "models", "model", "views", "view", "forms", "form", "middleware", "migrations",
    "plugins", "plugin", "core", "common", "base", "main", "src", "lib", "tests", "test",
    "api", "db", "database", "schema", "schemas", "serializers", "serializer", "urls",
    "routes", "router", "handlers", "handler", "services", "service", "tasks", "task",
    "constants", "types", "exceptions", "errors", "validators",
];
