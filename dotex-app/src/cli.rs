//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Headless dot attention experiment runner
#[derive(Parser, Debug)]
#[command(name = "dotex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a whole session against a simulated subject
    Run {
        /// Session config (JSON); the built-in moving + static session if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Frame rate of the host loop
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Pace frames against the wall clock instead of stepping instantly
        #[arg(long)]
        realtime: bool,

        /// Probability that the subject presses the matching arrow
        #[arg(long, default_value = "0.9")]
        accuracy: f64,

        /// Subject reaction time in ms
        #[arg(long, default_value = "450")]
        latency: f64,

        /// Directory for uploaded statistics
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        #[arg(long, default_value = "1920")]
        width: f64,

        #[arg(long, default_value = "1080")]
        height: f64,

        /// Seed for stimulus placement and the subject; random if omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Give up after this many frames
        #[arg(long, default_value = "1000000")]
        max_frames: u64,
    },

    /// Print a zig-zag trajectory as JSON
    Zigzag {
        #[arg(long)]
        width: f64,

        #[arg(long)]
        height: f64,

        #[arg(long, default_value = "3")]
        bounces: usize,

        /// Duration of the whole path in ms
        #[arg(long, default_value = "24000")]
        total_time: f64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["dotex", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                fps,
                realtime,
                accuracy,
                width,
                seed,
                ..
            } => {
                assert_eq!(fps, 60);
                assert!(!realtime);
                assert_eq!(accuracy, 0.9);
                assert_eq!(width, 1920.0);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn zigzag_needs_dimensions() {
        assert!(Cli::try_parse_from(["dotex", "zigzag", "--width", "10"]).is_err());
        let cli = Cli::try_parse_from(["dotex", "-v", "zigzag", "--width", "10", "--height", "10"])
            .unwrap();
        assert!(cli.verbose);
    }
}
