#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use depsleuth::cli_output::{print_plain, render_json};
use depsleuth::{infer, DepsleuthError, Options};

#[derive(Parser, Debug)]
#[command(name = "depsleuth", version, about = "Infers third-party Python dependencies and resolves them to PyPI distribution names")]
struct Cli {
    /// Project root to scan.
    #[arg(default_value = ".")]
    path: PathBuf,

    #[arg(long)]
    verbose: bool,

    /// Skip all network lookups; unresolved names stay unresolved.
    #[arg(long)]
    offline: bool,

    /// Print the resolved dependency list and warnings without writing
    /// anything (there is no manifest writer in this crate; kept so the
    /// CLI surface matches what a real wrapper would expect from the core).
    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    json: bool,

    /// Always print unresolved module names, not only under --verbose.
    #[arg(long)]
    show_unresolved: bool,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[arg(long)]
    lookup_workers: Option<usize>,

    #[arg(long)]
    parse_workers: Option<usize>,

    /// Additional file extension to scan (repeatable), e.g. `--ext .pyi`.
    #[arg(long = "ext")]
    extra_extensions: Vec<String>,

    /// Additional directory name to ignore during the scan (repeatable).
    #[arg(long = "ignore")]
    extra_ignore: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "depsleuth=debug" } else { "depsleuth=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Restores the default SIGPIPE disposition so writing to a closed stdout
/// (e.g. `depsleuth | head`) exits quietly instead of panicking on a
/// BrokenPipe write error, matching the teacher's documented intent for its
/// `libc` dependency.
#[cfg(unix)]
fn restore_default_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn restore_default_sigpipe() {}

/// Registers a SIGINT handler that flips the cooperative cancellation flag
/// `infer` checks between files and lookups, rather than terminating the
/// process immediately (spec.md §5).
#[cfg(unix)]
fn install_sigint_handler(flag: Arc<AtomicBool>) {
    use std::sync::OnceLock;
    static CANCEL_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    let _ = CANCEL_FLAG.set(flag);

    extern "C" fn handle_sigint(_: libc::c_int) {
        if let Some(flag) = CANCEL_FLAG.get() {
            flag.store(true, Ordering::SeqCst);
        }
    }
    unsafe {
        libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_sigint_handler(_flag: Arc<AtomicBool>) {}

fn build_options(cli: &Cli) -> Options {
    let mut options = Options::default();
    options.verbose = cli.verbose;
    options.offline = cli.offline;
    if let Some(cache_dir) = &cli.cache_dir {
        options.cache_dir = cache_dir.clone();
    }
    if let Some(n) = cli.lookup_workers {
        options.lookup_workers = n;
    }
    if let Some(n) = cli.parse_workers {
        options.parse_workers = n;
    }
    options.extensions.extend(cli.extra_extensions.iter().cloned());
    options.extra_ignore_dirs = cli.extra_ignore.iter().cloned().collect::<HashSet<_>>();
    options
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    restore_default_sigpipe();
    init_logging(cli.verbose);

    let cancelled = Arc::new(AtomicBool::new(false));
    install_sigint_handler(cancelled.clone());

    let options = build_options(&cli);
    let output = infer(&cli.path, &options, cancelled).map_err(|err| match err {
        DepsleuthError::RootNotFound(path) => anyhow::anyhow!("project root does not exist: {}", path.display()),
        DepsleuthError::RootNotADirectory(path) => anyhow::anyhow!("project root is not a directory: {}", path.display()),
        DepsleuthError::Io(io_err) => anyhow::Error::from(io_err),
    })?;

    if cli.json {
        println!("{}", render_json(&output));
    } else {
        print_plain(&output, cli.verbose, cli.show_unresolved);
        if cli.dry_run {
            println!("\n(dry run: no manifest was written)");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["depsleuth"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.verbose);
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = Cli::try_parse_from([
            "depsleuth",
            "myproject",
            "--verbose",
            "--offline",
            "--json",
            "--ext",
            ".pyi",
            "--ignore",
            "scratch",
        ])
        .unwrap();
        assert_eq!(cli.path, PathBuf::from("myproject"));
        assert!(cli.verbose);
        assert!(cli.offline);
        assert!(cli.json);
        assert_eq!(cli.extra_extensions, vec![".pyi".to_string()]);
        assert_eq!(cli.extra_ignore, vec!["scratch".to_string()]);
    }

    #[test]
    fn test_build_options_applies_overrides() {
        let cli = Cli::try_parse_from(["depsleuth", ".", "--lookup-workers", "77", "--parse-workers", "3"]).unwrap();
        let options = build_options(&cli);
        assert_eq!(options.lookup_workers, 77);
        assert_eq!(options.parse_workers, 3);
    }
}
