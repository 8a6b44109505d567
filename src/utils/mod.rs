use crate::builders::reporter::{ConsoleReporter, ReportFormat, RunSummary};
use crate::core::config::{CliOptions, ConfigManager, ConfigProvider, TraversalConfig};
use crate::core::walker::TreeWalker;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads and merges the configuration, validates it, then walks the tree.
/// Configuration problems are returned as errors before any file is touched.
pub fn run_fix(config_path: Option<PathBuf>, options: CliOptions) -> Result<RunSummary> {
    let config = load_traversal_config(config_path, options)?;
    debug!(?config, "starting run");

    let mut reporter = ConsoleReporter::stderr(config.verbose, config.dry_run);
    let mut walker = TreeWalker::new(&config)?;
    Ok(walker.run(&mut reporter))
}

pub fn load_traversal_config(
    config_path: Option<PathBuf>,
    options: CliOptions,
) -> Result<TraversalConfig> {
    let manager = ConfigManager::new(config_path);
    match manager.get_config_path() {
        Some(path) => debug!(path = %path.display(), "loading configuration file"),
        None => debug!("no configuration file, using built-in defaults"),
    }

    let file_config = manager.load_config()?;
    let config = TraversalConfig::merge(file_config, options);
    config.validate()?;
    Ok(config)
}

/// Prints the run summary on stdout in the requested format.
pub fn print_report(summary: &RunSummary, format: ReportFormat) -> Result<()> {
    println!("{}", summary.render(format)?);
    Ok(())
}
