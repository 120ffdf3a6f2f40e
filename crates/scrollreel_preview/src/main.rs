// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll reel previewer.
//!
//! Builds the reel for a storyboard and plays a simulated scroll gesture
//! through it, reporting:
//! - Scene placement and skipped sections
//! - Enter, exit and cue events per frame
//! - The label the reel settles on after snapping

mod cli;
mod preview;
mod storyboard;

use clap::Parser;
use cli::{Cli, Command};
use scrollreel_sequencer::ReelConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "scrollreel_preview=info,scrollreel_sequencer=warn";

fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Reports go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting scrollreel preview v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.cmd {
        Command::Run(args) => preview::run(&args),
        Command::DefaultConfig => ReelConfig::default().to_ron_string().map_err(preview::PreviewError::from),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("Preview failed: {e}");
            std::process::exit(1);
        }
    }
}
