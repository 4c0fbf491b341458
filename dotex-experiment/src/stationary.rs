use rand::Rng;
use tracing::debug;

use crate::config::ExperimentConfig;
use crate::state::{
    ExperimentCore, HIDE_DOTS, START_RECORDING, TAKE_PICTURE, TrialContext, TrialEvent, TrialHooks,
};

/// The trial-advance interval fires every `interval * STATIC_TRIAL_CADENCE`.
pub const STATIC_TRIAL_CADENCE: f64 = 2.0;

/// Immobile dots, repositioned at random every trial.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticVariant {
    /// How long dots stay up in a trial, in ms.
    pub interval: f64,
    pub recording_delay: Option<f64>,
    pub snap_after_display: Option<f64>,
}

impl StaticVariant {
    pub fn new(config: &ExperimentConfig) -> Self {
        Self {
            interval: config.interval.unwrap_or_default(),
            recording_delay: config.recording_delay,
            snap_after_display: config.snap_after_display,
        }
    }

    /// Cadence of the repeating trial-advance interval.
    pub fn trial_period(&self) -> f64 {
        self.interval * STATIC_TRIAL_CADENCE
    }
}

impl TrialHooks for StaticVariant {
    fn load_next_trial<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        core.randomize_dots(ctx.rng);
        core.show_dots(None, ctx);
        self.after_show_dots(core, None, ctx);
        ctx.scheduler
            .add_interval(HIDE_DOTS, self.interval, TrialEvent::HideDots, false);
        if let Some(delay) = self.recording_delay {
            ctx.scheduler
                .add_interval(START_RECORDING, delay, TrialEvent::StartRecording, false);
        }
    }

    fn after_display_indicators<R: Rng>(
        &mut self,
        _core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        // keep the clip buffered until the trial result can be attached
        ctx.media.stop_recording(false);
        if let Some(delay) = self.snap_after_display {
            ctx.scheduler
                .add_interval(TAKE_PICTURE, delay, TrialEvent::TakePicture, false);
        }
    }

    fn after_hide_dots<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        let Some(dot) = core.dots.first() else {
            return;
        };
        let mut metadata = format!("{}_{}", dot.x, dot.y);
        if let Some(result) = ctx.validity.per_dot_results.get(&core.trials_completed) {
            metadata.push_str(&format!("_{}", result.answer_correct));
        }
        debug!(trial = core.trials_completed, %metadata, "trial clip tagged");
        ctx.media.add_last_video_metadata(&metadata);
        ctx.media.send_videos();
    }
}
