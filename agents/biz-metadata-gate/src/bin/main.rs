//! biz_metadata gate CLI
//!
//! # Usage
//!
//! ```bash
//! biz-metadata-lint check --input dict/ --mode publish -o report.json
//! biz-metadata-lint rules --mode import
//! ```
//!
//! # Exit Codes
//!
//! - 0: Gate passed
//! - 1: Runtime or configuration error
//! - 2: Gate failed (ERRORs, or WARNs with --fail-on-warn)

use biz_metadata_gate::{run_cli, GateCli};
use clap::Parser;
use tracing::Level;

fn main() {
    let cli = GateCli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    // Logs go to stderr so stdout stays a clean report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
