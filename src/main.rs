/// Fix trivial errors in a source tree:
///  - add a newline to files that don't end in one,
///  - normalize SIGNAL and SLOT signatures,
///  - drop repeated #include directives.
///
/// Recommended: do a `--dry-run --verbose` pass before the real one.
use anyhow::Result;
use clap::Parser;
use fixsrc::builders::reporter::ReportFormat;
use fixsrc::core::config::{Action, CliOptions};
use fixsrc::utils;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fixsrc", version)]
#[command(about = "Fix trivial errors in the source tree")]
#[command(after_help = "Example:\n  fixsrc -rv --actions normalize-signatures libs")]
struct Cli {
    /// Comma separated list of actions to perform
    #[arg(short, long, value_enum, value_delimiter = ',')]
    actions: Vec<Action>,

    /// Don't actually perform the actions (combine with --verbose)
    #[arg(short, long, visible_alias = "dryrun")]
    dry_run: bool,

    /// Traverse directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Print per-file notices on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Only process files whose name matches this glob (repeatable)
    #[arg(short, long = "pattern", value_name = "GLOB")]
    patterns: Vec<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a summary of the run on stdout
    #[arg(long, value_enum, value_name = "FORMAT")]
    report: Option<ReportFormat>,

    /// Source files to fix, and directories if --recursive is given
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_tracing();

    let options = CliOptions {
        actions: cli.actions,
        patterns: cli.patterns,
        recursive: cli.recursive,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        paths: cli.paths,
    };

    let summary = utils::run_fix(cli.config, options)?;
    if let Some(format) = cli.report {
        utils::print_report(&summary, format)?;
    }
    Ok(())
}
