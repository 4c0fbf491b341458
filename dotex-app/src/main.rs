mod app;
mod cli;
mod subject;
mod upload;

use anyhow::{Context, Result};
use dotex_core::Viewport;
use dotex_experiment::{SessionConfig, generate_zigzag};
use dotex_timing::FrameStats;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, RunOptions};
use cli::{Cli, Commands};
use subject::SimulatedSubject;
use upload::JsonDirUploader;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            fps,
            realtime,
            accuracy,
            latency,
            out,
            width,
            height,
            seed,
            max_frames,
        } => {
            let config = match config {
                Some(path) => SessionConfig::load(&path)
                    .with_context(|| format!("loading session config {}", path.display()))?,
                None => SessionConfig::default(),
            };
            let (session_rng, subject_rng) = match seed {
                Some(seed) => (
                    StdRng::seed_from_u64(seed),
                    StdRng::seed_from_u64(seed.wrapping_add(1)),
                ),
                None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
            };
            let uploader = JsonDirUploader::new(&out)
                .with_context(|| format!("preparing output directory {}", out.display()))?;
            let subject = SimulatedSubject::new(accuracy, latency, subject_rng);
            let options = RunOptions {
                fps,
                realtime,
                viewport: Viewport::new(width, height),
                max_frames,
            };

            let app = App::new(&config, uploader, subject, session_rng, options)?;
            let (result, stats) = app.run()?;
            if realtime {
                report_frames(&stats);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Zigzag {
            width,
            height,
            bounces,
            total_time,
        } => {
            let trajectory = generate_zigzag(width, height, bounces, total_time);
            println!("{}", serde_json::to_string_pretty(&trajectory)?);
        }
    }

    Ok(())
}

fn report_frames(stats: &FrameStats) {
    info!(
        avg_ms = stats.average_frame_time_ns / 1e6,
        jitter_ms = stats.jitter_ns / 1e6,
        min_ms = stats.min_frame_time_ns / 1e6,
        max_ms = stats.max_frame_time_ns / 1e6,
        fps = stats.effective_fps,
        "frame timing"
    );
}
