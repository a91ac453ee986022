//! Binary crate for the `hazard` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive provider configuration
//! - JSON output of canonical records

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level comes from RUST_LOG when set; records go to stderr so JSON
    // output on stdout stays pipeable.
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()?;

    let cmd = cli::Cli::parse();
    cmd.run().await
}
