use std::io::IsTerminal;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use miette::{IntoDiagnostic, Result};
use tracing_log::AsTrace;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Inspect, verify and re-save M3 model and animation containers
#[derive(Parser)]
#[command(name = "m3", version, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "Log output goes to stderr and honours RUST_LOG, for example RUST_LOG=m3_codec=debug.")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: commands::Commands,
}

/// Sends codec logs to stderr so `dump` output on stdout stays parseable
fn init_logging(verbose: &Verbosity<InfoLevel>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(verbose.log_level_filter().as_trace().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .with_target(true)
                .without_time()
                .compact(),
        )
        .with(filter)
        .try_init()
        .into_diagnostic()
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    init_logging(&cli.verbose)?;

    cli.command.handle()
}
