use std::time::Duration;

use anyhow::{Result, bail};
use dotex_core::{SessionPhase, Viewport, keycodes};
use dotex_experiment::{NullMedia, Session, SessionConfig, SessionResult};
use dotex_timing::{Clock, FrameClock, FrameStats};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::subject::SimulatedSubject;
use crate::upload::JsonDirUploader;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub fps: u32,
    pub realtime: bool,
    pub viewport: Viewport,
    pub max_frames: u64,
}

/// Host loop: feeds frame time into the session and the subject's keys back.
pub struct App {
    session: Session<NullMedia, JsonDirUploader, StdRng>,
    subject: SimulatedSubject<StdRng>,
    clock: FrameClock,
    options: RunOptions,
    frames: u64,
}

impl App {
    pub fn new(
        config: &SessionConfig,
        uploader: JsonDirUploader,
        subject: SimulatedSubject<StdRng>,
        rng: StdRng,
        options: RunOptions,
    ) -> Result<Self> {
        if options.fps == 0 {
            bail!("fps must be positive");
        }
        let session = Session::from_config(config, options.viewport, NullMedia, uploader, rng)?;
        Ok(Self {
            session,
            subject,
            clock: FrameClock::new(),
            options,
            frames: 0,
        })
    }

    pub fn run(mut self) -> Result<(SessionResult, FrameStats)> {
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(self.options.fps));
        let fixed_dt = frame_time.as_secs_f64() * 1e3;
        info!(
            fps = self.options.fps,
            realtime = self.options.realtime,
            width = self.options.viewport.width,
            height = self.options.viewport.height,
            "session starting"
        );

        loop {
            match self.session.phase() {
                SessionPhase::Waiting => self.session.ready(self.options.viewport),
                SessionPhase::Ready => {
                    if let Some(text) = self.session.instructions() {
                        debug!(experiment = self.session.experiment_counter(), "{text}");
                    }
                    self.session.key_pressed(keycodes::ARROW_LEFT);
                }
                SessionPhase::Running => {}
                SessionPhase::Complete => break,
            }

            if self.frames >= self.options.max_frames {
                bail!("session did not finish within {} frames", self.options.max_frames);
            }
            self.frames += 1;

            let frame_start = self.clock.now();
            let dt = if self.options.realtime {
                self.clock.frame_delta_ms()
            } else {
                fixed_dt
            };
            self.session.update(dt)?;

            let now = self.session.time();
            if let Some(code) = self.subject.observe(now, self.session.experiment().dots()) {
                let valid = self.session.key_pressed(code);
                debug!(now, code, ?valid, "key pressed");
            }

            if self.options.realtime {
                self.clock.pace(frame_start, frame_time);
            }
        }

        let result = self.session.result();
        info!(
            frames = self.frames,
            elapsed_ms = self.session.time(),
            score = result.score,
            tests = result.tests,
            files = self.session.uploader().written().len(),
            out = %self.session.uploader().dir().display(),
            "session complete"
        );
        Ok((result, self.clock.frame_stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotex_experiment::{ExperimentConfig, ExperimentSpec};
    use rand::SeedableRng;

    fn options() -> RunOptions {
        RunOptions {
            fps: 60,
            realtime: false,
            viewport: Viewport::new(800.0, 600.0),
            max_frames: 100_000,
        }
    }

    fn short_static_session() -> SessionConfig {
        let config = ExperimentConfig {
            trials: 3,
            interval: Some(1500.0),
            ..ExperimentConfig::static_default()
        };
        let ExperimentSpec::Static { dots, .. } = ExperimentSpec::default_static() else {
            unreachable!()
        };
        SessionConfig {
            experiments: vec![ExperimentSpec::Static { config, dots }],
        }
    }

    #[test]
    fn headless_run_completes_and_writes_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = JsonDirUploader::new(dir.path()).unwrap();
        let subject = SimulatedSubject::new(1.0, 200.0, StdRng::seed_from_u64(2));
        let app = App::new(
            &short_static_session(),
            uploader,
            subject,
            StdRng::seed_from_u64(3),
            options(),
        )
        .unwrap();

        let (result, stats) = app.run().unwrap();
        assert_eq!(result.tests, 3);
        assert_eq!(result.score, 3);
        assert_eq!(stats, FrameStats::default());
        assert!(dir.path().join("experiment_0.json").exists());
    }

    #[test]
    fn frame_budget_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = JsonDirUploader::new(dir.path()).unwrap();
        let subject = SimulatedSubject::new(1.0, 200.0, StdRng::seed_from_u64(2));
        let options = RunOptions {
            max_frames: 10,
            ..options()
        };
        let app = App::new(
            &SessionConfig::default(),
            uploader,
            subject,
            StdRng::seed_from_u64(3),
            options,
        )
        .unwrap();
        assert!(app.run().is_err());
    }

    #[test]
    fn zero_fps_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = JsonDirUploader::new(dir.path()).unwrap();
        let subject = SimulatedSubject::new(1.0, 200.0, StdRng::seed_from_u64(2));
        let options = RunOptions { fps: 0, ..options() };
        let app = App::new(
            &SessionConfig::default(),
            uploader,
            subject,
            StdRng::seed_from_u64(3),
            options,
        );
        assert!(app.is_err());
    }
}
