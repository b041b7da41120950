//! CLI entry point for appsweep.
//!
//! This binary finds the files an installed macOS application has left
//! around the system and prints them with their sizes.
//!
//! # Usage
//!
//! ```bash
//! appsweep [OPTIONS] <COMMAND>
//!
//! # List everything that belongs to an app
//! appsweep scan /Applications/Bar.app
//!
//! # Several apps at once, collected into the bulk store
//! appsweep scan --bulk /Applications/Bar.app /Applications/Baz.app
//!
//! # Machine-readable output restricted to two roots
//! appsweep --root ~/Library/Caches --root ~/Library/Preferences scan --format json /Applications/Bar.app
//!
//! # Print the effective configuration
//! appsweep config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use sweep_core::{AppDescriptor, Config, RunMode, expand_home};
use sweep_scanner::{AppStore, Discovery, DiscoveryResult};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Finds the support files, caches and containers an application leaves behind.
#[derive(Parser)]
#[command(name = "appsweep", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    #[arg(short, long, global = true, env = "APPSWEEP_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Search root to scan instead of the configured ones (repeatable).
    #[arg(long = "root", global = true, value_name = "DIR")]
    roots: Vec<Utf8PathBuf>,

    /// Maximum number of parallel scan jobs.
    #[arg(short, long, global = true, env = "APPSWEEP_JOBS")]
    jobs: Option<usize>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Discover the files that belong to one or more application bundles.
    Scan {
        /// Application bundles to inspect. Several bundles need --bulk or --background.
        #[arg(required = true, value_name = "BUNDLE")]
        bundles: Vec<Utf8PathBuf>,

        /// Bundle identifier to use instead of the one in `Info.plist`.
        #[arg(long, requires = "name")]
        bundle_id: Option<String>,

        /// Display name to use instead of the one in `Info.plist`.
        #[arg(long, requires = "bundle_id")]
        name: Option<String>,

        /// Treat the bundle as a browser-generated web app.
        #[arg(long)]
        web_app: bool,

        /// Only compute sizes; nothing is selected.
        #[arg(long)]
        background: bool,

        /// Append every result to the bulk store.
        #[arg(long)]
        bulk: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the effective configuration as JSON.
    Config,
}

/// Result output format.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable listing.
    Text,
    /// JSON document.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so the
/// listing on stdout stays readable. Logs go to stderr.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the result is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = expand_home(path);
            info!(%path, "Loading configuration");
            Config::from_file(&path)?
        }
        None => Config::default(),
    };

    if !cli.roots.is_empty() {
        config.discovery.search_roots.clone_from(&cli.roots);
    }
    if cli.jobs.is_some() {
        config.discovery.max_parallel_jobs = cli.jobs;
    }

    config.validate()?;
    Ok(config)
}

/// Builds the descriptor for one bundle.
///
/// Explicit identifier and name win over `Info.plist`; the web app flag is
/// forced on when requested.
fn describe(
    bundle: &Utf8Path,
    bundle_id: Option<&str>,
    name: Option<&str>,
    web_app: bool,
) -> color_eyre::Result<AppDescriptor> {
    let descriptor = match (bundle_id, name) {
        (Some(bundle_id), Some(name)) => AppDescriptor::new(bundle, bundle_id, name),
        _ => AppDescriptor::from_bundle(bundle)
            .map_err(|e| color_eyre::eyre::eyre!("Cannot describe {bundle}: {e}"))?,
    };
    Ok(if web_app {
        descriptor.with_web_app(true)
    } else {
        descriptor
    })
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Options of the `scan` command.
struct ScanOptions<'a> {
    bundles: &'a [Utf8PathBuf],
    bundle_id: Option<&'a str>,
    name: Option<&'a str>,
    web_app: bool,
    mode: RunMode,
    format: OutputFormat,
}

/// Runs discovery for every bundle and prints what the mode published.
///
/// # Errors
///
/// Returns an error if the engine cannot be built, a bundle cannot be
/// described, or output fails.
async fn run_scan(config: &Config, options: &ScanOptions<'_>) -> color_eyre::Result<()> {
    check_scan_options(options)?;

    let discovery = Discovery::from_config(config)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create discovery engine: {}", e))?;
    let store = AppStore::new();
    let roots = discovery.search_roots();

    let mut computed = Vec::with_capacity(options.bundles.len());
    for bundle in options.bundles {
        let app = describe(bundle, options.bundle_id, options.name, options.web_app)?;
        info!(bundle_id = %app.bundle_id, mode = options.mode.label(), "Scanning");
        computed.push(
            discovery
                .discover(app, roots.clone(), options.mode, &store)
                .await,
        );
    }

    // Print what the sink received; background runs only have their return values
    let results = match options.mode {
        RunMode::Interactive => store.selected().into_iter().collect(),
        RunMode::BulkAppend => store.take_bulk(),
        RunMode::Background => computed,
    };

    match options.format {
        OutputFormat::Text => print_text(&results, options.mode)?,
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

/// Rejects option combinations that would drop results.
///
/// An interactive run publishes a single selection, so scanning several
/// bundles interactively would keep only the last one.
fn check_scan_options(options: &ScanOptions<'_>) -> color_eyre::Result<()> {
    if options.bundles.len() <= 1 {
        return Ok(());
    }
    if options.bundle_id.is_some() {
        return Err(color_eyre::eyre::eyre!(
            "--bundle-id and --name apply to a single bundle"
        ));
    }
    if options.mode == RunMode::Interactive {
        return Err(color_eyre::eyre::eyre!(
            "Scanning several bundles needs --bulk or --background"
        ));
    }
    Ok(())
}

/// Prints the effective configuration.
fn run_config(config: &Config) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints each result as an indented listing with sizes.
fn print_text(results: &[DiscoveryResult], mode: RunMode) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    for result in results {
        let total = result.total_size();
        writeln!(
            handle,
            "{} ({}) - {} paths, {}",
            result.app.name,
            result.app.bundle_id,
            result.len(),
            format_bytes(total.real)
        )?;

        if mode == RunMode::Background {
            continue;
        }
        for entry in &result.paths {
            writeln!(handle, "  {:>10}  {}", format_bytes(entry.size.real), entry.path)?;
        }
        writeln!(handle)?;
    }

    Ok(())
}

/// Prints the results as a pretty JSON array.
fn print_json(results: &[DiscoveryResult]) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

/// Formats a byte count with a binary unit suffix.
#[allow(clippy::cast_precision_loss)] // Acceptable for display
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Scan {
            bundles,
            bundle_id,
            name,
            web_app,
            background,
            bulk,
            format,
        } => {
            let options = ScanOptions {
                bundles,
                bundle_id: bundle_id.as_deref(),
                name: name.as_deref(),
                web_app: *web_app,
                mode: RunMode::from_flags(*background, *bulk),
                format: *format,
            };
            run_scan(&config, &options).await
        }
        Commands::Config => run_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::parse_from([
            "appsweep",
            "--root",
            "/Library/Caches",
            "--root",
            "/Users/Shared",
            "scan",
            "--bulk",
            "--background",
            "/Applications/Bar.app",
        ]);
        assert_eq!(cli.roots.len(), 2);
        match cli.command {
            Commands::Scan {
                bundles,
                background,
                bulk,
                ..
            } => {
                assert_eq!(bundles, [Utf8PathBuf::from("/Applications/Bar.app")]);
                assert_eq!(RunMode::from_flags(background, bulk), RunMode::BulkAppend);
            }
            Commands::Config => unreachable!("parsed a scan command"),
        }
    }

    #[test]
    fn test_bundle_id_requires_name() {
        let parsed = Cli::try_parse_from([
            "appsweep",
            "scan",
            "--bundle-id",
            "com.foo.bar",
            "/Applications/Bar.app",
        ]);
        assert!(parsed.is_err());
    }

    fn scan_options(bundles: &[Utf8PathBuf], mode: RunMode) -> ScanOptions<'_> {
        ScanOptions {
            bundles,
            bundle_id: None,
            name: None,
            web_app: false,
            mode,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_several_bundles_need_bulk_or_background() {
        let bundles = [
            Utf8PathBuf::from("/Applications/Bar.app"),
            Utf8PathBuf::from("/Applications/Baz.app"),
        ];
        assert!(check_scan_options(&scan_options(&bundles, RunMode::Interactive)).is_err());
        assert!(check_scan_options(&scan_options(&bundles, RunMode::BulkAppend)).is_ok());
        assert!(check_scan_options(&scan_options(&bundles, RunMode::Background)).is_ok());
        assert!(check_scan_options(&scan_options(&bundles[..1], RunMode::Interactive)).is_ok());

        let explicit = ScanOptions {
            bundle_id: Some("com.foo.bar"),
            name: Some("Bar"),
            ..scan_options(&bundles, RunMode::BulkAppend)
        };
        assert!(check_scan_options(&explicit).is_err());
    }

    #[test]
    fn test_build_config_applies_overrides() {
        let cli = Cli::parse_from(["appsweep", "--root", "/Library/Caches", "--jobs", "3", "config"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(
            config.discovery.search_roots,
            [Utf8PathBuf::from("/Library/Caches")]
        );
        assert_eq!(config.discovery.max_parallel_jobs, Some(3));
    }

    #[test]
    fn test_build_config_rejects_zero_jobs() {
        let cli = Cli::parse_from(["appsweep", "--jobs", "0", "config"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_describe_with_explicit_identity() {
        let bundle = Utf8Path::new("/Applications/Site.app");
        let app = describe(bundle, Some("com.example.site"), Some("Site"), true).unwrap();
        assert_eq!(app.bundle_id, "com.example.site");
        assert!(app.web_app);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
