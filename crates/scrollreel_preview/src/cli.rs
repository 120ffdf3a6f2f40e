// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrollreel-preview", version, about = "Preview a scroll reel without a browser")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a reel from a storyboard and simulate scrolling through it.
    Run(RunArgs),
    /// Print the default reel configuration as RON.
    DefaultConfig,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Storyboard file (RON).
    pub storyboard: PathBuf,

    /// Reel configuration file (RON). Defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames the scroll gesture lasts.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Progress the gesture scrolls to.
    #[arg(long, default_value_t = 1.0)]
    pub scroll_to: f32,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
