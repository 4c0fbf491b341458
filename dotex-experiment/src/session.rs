//! Runs a queue of experiments against one scheduler, one validity tracker
//! and the host's capture and upload collaborators.

use std::collections::VecDeque;

use dotex_core::{ExperimentKind, SessionPhase, TrialResults, Viewport, keycodes};
use dotex_timing::Scheduler;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ConfigError, ExperimentError};
use crate::media::{MediaCapture, StatisticsUploader};
use crate::state::{DotExperiment, ExperimentEvent, NEXT_TRIAL, TrialContext, TrialEvent};
use crate::validity::ValidityTracker;

/// Scores of the experiment currently loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub score: usize,
    pub tests: usize,
    pub per_dot_results: TrialResults,
}

pub struct Session<M, U, R> {
    experiment: DotExperiment,
    queue: VecDeque<DotExperiment>,
    scheduler: Scheduler<TrialEvent>,
    validity: ValidityTracker,
    media: M,
    uploader: U,
    rng: R,
    phase: SessionPhase,
    viewport: Option<Viewport>,
    /// Zero-based index of the current experiment, sent as upload metadata.
    experiment_counter: usize,
}

impl<M, U, R> Session<M, U, R>
where
    M: MediaCapture,
    U: StatisticsUploader,
    R: Rng,
{
    /// The first experiment runs first, the rest wait in order.
    pub fn new(
        experiments: Vec<DotExperiment>,
        media: M,
        uploader: U,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let mut queue = VecDeque::from(experiments);
        let experiment = queue
            .pop_front()
            .ok_or_else(|| ConfigError::Invalid("session has no experiments".into()))?;
        Ok(Self {
            experiment,
            queue,
            scheduler: Scheduler::new(false),
            validity: ValidityTracker::new(),
            media,
            uploader,
            rng,
            phase: SessionPhase::Waiting,
            viewport: None,
            experiment_counter: 0,
        })
    }

    pub fn from_config(
        config: &SessionConfig,
        viewport: Viewport,
        media: M,
        uploader: U,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        let experiments = config
            .experiments
            .iter()
            .cloned()
            .map(|spec| DotExperiment::from_spec(spec, viewport))
            .collect();
        Self::new(experiments, media, uploader, rng)
    }

    /// The subject is ready: fit the current experiment to `viewport` and
    /// show its instructions.
    pub fn ready(&mut self, viewport: Viewport) {
        self.resize(viewport);
        if self.phase == SessionPhase::Waiting {
            self.phase = SessionPhase::Ready;
            debug!(kind = ?self.experiment.kind(), "waiting for first key");
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.experiment.prepare(viewport);
    }

    /// An arrow key starts a ready experiment. Any other key, and every key
    /// while running, is scored against the live indicators.
    pub fn key_pressed(&mut self, code: u32) -> Option<usize> {
        match self.phase {
            SessionPhase::Ready if keycodes::is_arrow(code) => {
                self.start();
                None
            }
            phase if phase.allows_input() => {
                let trial = self.experiment.trials_completed();
                self.validity
                    .check_validity(self.experiment.dots_mut(), trial, code, &mut self.media)
            }
            _ => None,
        }
    }

    fn start(&mut self) {
        match self.experiment.kind() {
            ExperimentKind::Static => {
                let period = self
                    .experiment
                    .stationary()
                    .map(|v| v.trial_period())
                    .unwrap_or_default();
                self.scheduler
                    .add_interval(NEXT_TRIAL, period, TrialEvent::NextTrial, true);
            }
            ExperimentKind::Moving => {
                self.media.start_recording();
                let mut ctx = TrialContext {
                    scheduler: &mut self.scheduler,
                    validity: &mut self.validity,
                    media: &mut self.media,
                    rng: &mut self.rng,
                };
                self.experiment.show_dots(None, &mut ctx);
            }
        }
        self.experiment.begin();
        self.scheduler.start();
        self.phase = SessionPhase::Running;
        info!(
            experiment = self.experiment_counter,
            kind = ?self.experiment.kind(),
            "session running"
        );
    }

    /// Advances the session by `dt` ms. Does nothing unless running.
    pub fn update(&mut self, dt: f64) -> Result<(), ExperimentError> {
        if self.phase != SessionPhase::Running {
            return Ok(());
        }

        let mut events = Vec::new();
        let Self {
            experiment,
            scheduler,
            validity,
            media,
            rng,
            ..
        } = self;
        scheduler.tick(dt, |scheduler, event| {
            let mut ctx = TrialContext {
                scheduler,
                validity: &mut *validity,
                media: &mut *media,
                rng: &mut *rng,
            };
            if let Some(signal) = experiment.dispatch(event, &mut ctx) {
                events.push(signal);
            }
        });
        if !events.contains(&ExperimentEvent::ExperimentEnd) {
            events.extend(experiment.update(dt)?);
        }

        for event in events {
            match event {
                ExperimentEvent::PathEnd => self.media.stop_recording(true),
                ExperimentEvent::ExperimentEnd => {
                    self.end_of_experiment();
                    break;
                }
            }
        }
        Ok(())
    }

    fn end_of_experiment(&mut self) {
        self.scheduler.stop();
        self.upload_results();

        let Some(next) = self.queue.pop_front() else {
            self.phase = SessionPhase::Complete;
            info!(experiments = self.experiment_counter + 1, "session complete");
            return;
        };
        self.experiment_counter += 1;
        self.experiment = next;
        self.validity = ValidityTracker::new();
        self.scheduler.clear_intervals();
        self.phase = match self.viewport {
            Some(viewport) => {
                self.experiment.prepare(viewport);
                SessionPhase::Ready
            }
            None => SessionPhase::Waiting,
        };
        info!(
            experiment = self.experiment_counter,
            kind = ?self.experiment.kind(),
            remaining = self.queue.len(),
            "next experiment loaded"
        );
    }

    fn upload_results(&mut self) {
        let statistics = match serde_json::to_string(&self.validity.per_dot_results) {
            Ok(statistics) => statistics,
            Err(err) => {
                warn!(%err, "failed to encode statistics");
                return;
            }
        };
        let metadata = self.experiment_counter.to_string();
        match self.uploader.upload_statistics(&metadata, &statistics) {
            Ok(()) => info!(
                experiment = self.experiment_counter,
                score = self.validity.score,
                tests = self.validity.tests,
                "statistics uploaded"
            ),
            Err(err) => warn!(
                %err,
                experiment = self.experiment_counter,
                "statistics upload failed"
            ),
        }
    }

    pub fn result(&self) -> SessionResult {
        SessionResult {
            score: self.validity.score,
            tests: self.validity.tests,
            per_dot_results: self.validity.per_dot_results.clone(),
        }
    }

    /// Elapsed scheduler time in ms, cumulative across experiments.
    pub fn time(&self) -> f64 {
        self.scheduler.elapsed()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Instruction text while waiting for the first key.
    pub fn instructions(&self) -> Option<&'static str> {
        self.phase
            .shows_instructions()
            .then(|| self.experiment.kind().instructions())
    }

    pub fn experiment(&self) -> &DotExperiment {
        &self.experiment
    }

    pub fn experiment_counter(&self) -> usize {
        self.experiment_counter
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn scheduler(&self) -> &Scheduler<TrialEvent> {
        &self.scheduler
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }
}
