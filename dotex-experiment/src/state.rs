use dotex_core::{Dot, ExperimentKind, IndicatorSymbol, TrialPhase, Viewport, colors};
use dotex_timing::Scheduler;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{ExperimentConfig, ExperimentSpec};
use crate::error::ExperimentError;
use crate::media::MediaCapture;
use crate::moving::MovingVariant;
use crate::stationary::StaticVariant;
use crate::validity::ValidityTracker;

pub const NEXT_TRIAL: &str = "next_trial";
pub const HIDE_DOTS: &str = "hide_dots";
pub const DISPLAY_INDICATORS: &str = "display_indicators";
pub const HIDE_INDICATORS: &str = "hide_indicators";
pub const START_RECORDING: &str = "start_recording";
pub const TAKE_PICTURE: &str = "take_picture";

/// Work the scheduler hands back to the experiment when an interval fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEvent {
    NextTrial,
    HideDots,
    DisplayIndicators,
    HideIndicators,
    StartRecording,
    TakePicture,
}

/// Signals an experiment raises to whoever runs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentEvent {
    /// A moving dot ran out of trajectory.
    PathEnd,
    ExperimentEnd,
}

/// Everything an experiment may touch while handling a trial step.
pub struct TrialContext<'a, R: Rng> {
    pub scheduler: &'a mut Scheduler<TrialEvent>,
    pub validity: &'a mut ValidityTracker,
    pub media: &'a mut dyn MediaCapture,
    pub rng: &'a mut R,
}

/// State shared by both experiment variants.
#[derive(Debug, Clone)]
pub struct ExperimentCore {
    pub dots: Vec<Dot>,
    pub config: ExperimentConfig,
    pub trials_completed: usize,
    pub trials_total: usize,
    /// `None` means indicators are unbounded.
    pub indicators_left: Option<u32>,
    pub phase: TrialPhase,
    pub viewport: Viewport,
}

impl ExperimentCore {
    pub fn new(dots: Vec<Dot>, config: ExperimentConfig, viewport: Viewport) -> Self {
        Self {
            trials_total: config.trials,
            indicators_left: config.indicator_count,
            trials_completed: 0,
            phase: TrialPhase::Idle,
            dots,
            config,
            viewport,
        }
    }

    /// Makes the selected dots (all if `None`) visible. Showing all of them
    /// also schedules the next indicator display.
    pub fn show_dots<R: Rng>(&mut self, subset: Option<&[usize]>, ctx: &mut TrialContext<'_, R>) {
        match subset {
            None => {
                let offset = self.config.random_indicator_offset;
                for dot in &mut self.dots {
                    dot.visible = true;
                    let delay = dot.indicator.delay + ctx.rng.random::<f64>() * offset;
                    debug!(delay, "indicator scheduled");
                    ctx.scheduler.add_interval(
                        DISPLAY_INDICATORS,
                        delay,
                        TrialEvent::DisplayIndicators,
                        false,
                    );
                }
            }
            Some(indices) => for_selected(&mut self.dots, indices, |dot| dot.visible = true),
        }
    }

    pub fn hide_dots(&mut self, subset: Option<&[usize]>) {
        match subset {
            None => self.dots.iter_mut().for_each(|dot| dot.visible = false),
            Some(indices) => for_selected(&mut self.dots, indices, |dot| dot.visible = false),
        }
    }

    /// Places every dot uniformly at random, inset so its full pulse stays on screen.
    pub fn randomize_dots<R: Rng>(&mut self, rng: &mut R) {
        let Viewport { width, height } = self.viewport;
        for dot in &mut self.dots {
            let inset = dot.pulse.target_r;
            dot.x = inset + rng.random::<f64>() * (width - inset * 2.0);
            dot.y = inset + rng.random::<f64>() * (height - inset * 2.0);
        }
    }

    /// Returns whether indicators were shown; an exhausted budget shows nothing.
    pub fn display_indicators<R: Rng>(&mut self, ctx: &mut TrialContext<'_, R>) -> bool {
        if self.indicators_left.is_some_and(|left| left == 0) {
            return false;
        }
        for dot in &mut self.dots {
            let pick = ctx.rng.random_range(0..IndicatorSymbol::ALL.len());
            dot.indicator.symbol = IndicatorSymbol::ALL[pick];
            dot.indicator.color = colors::WHITE;
            ctx.scheduler.add_interval(
                HIDE_INDICATORS,
                dot.indicator.display_time,
                TrialEvent::HideIndicators,
                false,
            );
        }
        if let Some(left) = self.indicators_left.as_mut() {
            *left -= 1;
        }
        ctx.validity.reset_input_test();
        debug!(trial = self.trials_completed, "indicators shown");
        true
    }

    /// Hides every indicator; a trial without a response is recorded as a miss.
    pub fn hide_indicators(&mut self, validity: &mut ValidityTracker) {
        for dot in &mut self.dots {
            dot.indicator.color = colors::INVISIBLE;
            validity.record_missed(self.trials_completed, dot);
        }
        debug!(trial = self.trials_completed, "indicators hidden");
    }
}

fn for_selected(dots: &mut [Dot], indices: &[usize], mut f: impl FnMut(&mut Dot)) {
    for &ix in indices {
        if let Some(dot) = dots.get_mut(ix) {
            f(dot);
        }
    }
}

/// Variant-specific steps of the trial lifecycle. Every hook defaults to a no-op.
pub trait TrialHooks {
    fn load_next_trial<R: Rng>(
        &mut self,
        _core: &mut ExperimentCore,
        _ctx: &mut TrialContext<'_, R>,
    ) {
    }

    fn after_show_dots<R: Rng>(
        &mut self,
        _core: &mut ExperimentCore,
        _subset: Option<&[usize]>,
        _ctx: &mut TrialContext<'_, R>,
    ) {
    }

    fn after_hide_dots<R: Rng>(
        &mut self,
        _core: &mut ExperimentCore,
        _ctx: &mut TrialContext<'_, R>,
    ) {
    }

    fn after_display_indicators<R: Rng>(
        &mut self,
        _core: &mut ExperimentCore,
        _ctx: &mut TrialContext<'_, R>,
    ) {
    }

    /// Per-tick work outside the scheduler.
    fn update(
        &mut self,
        _core: &mut ExperimentCore,
        _dt: f64,
    ) -> Result<Vec<ExperimentEvent>, ExperimentError> {
        Ok(Vec::new())
    }

    /// Adapts variant state to a (new) viewport.
    fn prepare(&mut self, _core: &mut ExperimentCore) {}
}

#[derive(Debug, Clone)]
pub enum Variant {
    Static(StaticVariant),
    Moving(MovingVariant),
}

impl TrialHooks for Variant {
    fn load_next_trial<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        match self {
            Variant::Static(v) => v.load_next_trial(core, ctx),
            Variant::Moving(v) => v.load_next_trial(core, ctx),
        }
    }

    fn after_show_dots<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        subset: Option<&[usize]>,
        ctx: &mut TrialContext<'_, R>,
    ) {
        match self {
            Variant::Static(v) => v.after_show_dots(core, subset, ctx),
            Variant::Moving(v) => v.after_show_dots(core, subset, ctx),
        }
    }

    fn after_hide_dots<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        match self {
            Variant::Static(v) => v.after_hide_dots(core, ctx),
            Variant::Moving(v) => v.after_hide_dots(core, ctx),
        }
    }

    fn after_display_indicators<R: Rng>(
        &mut self,
        core: &mut ExperimentCore,
        ctx: &mut TrialContext<'_, R>,
    ) {
        match self {
            Variant::Static(v) => v.after_display_indicators(core, ctx),
            Variant::Moving(v) => v.after_display_indicators(core, ctx),
        }
    }

    fn update(
        &mut self,
        core: &mut ExperimentCore,
        dt: f64,
    ) -> Result<Vec<ExperimentEvent>, ExperimentError> {
        match self {
            Variant::Static(v) => v.update(core, dt),
            Variant::Moving(v) => v.update(core, dt),
        }
    }

    fn prepare(&mut self, core: &mut ExperimentCore) {
        match self {
            Variant::Static(v) => v.prepare(core),
            Variant::Moving(v) => v.prepare(core),
        }
    }
}

/// A dot experiment: the shared trial state machine plus its variant.
#[derive(Debug, Clone)]
pub struct DotExperiment {
    core: ExperimentCore,
    variant: Variant,
}

impl DotExperiment {
    pub fn new_static(dots: Vec<Dot>, config: ExperimentConfig, viewport: Viewport) -> Self {
        let variant = Variant::Static(StaticVariant::new(&config));
        Self {
            core: ExperimentCore::new(dots, config, viewport),
            variant,
        }
    }

    pub fn new_moving(dots: Vec<Dot>, config: ExperimentConfig, viewport: Viewport) -> Self {
        let variant = Variant::Moving(MovingVariant::new(&dots));
        Self {
            core: ExperimentCore::new(dots, config, viewport),
            variant,
        }
    }

    pub fn from_spec(spec: ExperimentSpec, viewport: Viewport) -> Self {
        match spec {
            ExperimentSpec::Static { config, dots } => Self::new_static(dots, config, viewport),
            ExperimentSpec::Moving { config, dots } => Self::new_moving(dots, config, viewport),
        }
    }

    pub fn kind(&self) -> ExperimentKind {
        match self.variant {
            Variant::Static(_) => ExperimentKind::Static,
            Variant::Moving(_) => ExperimentKind::Moving,
        }
    }

    pub fn core(&self) -> &ExperimentCore {
        &self.core
    }

    pub fn dots(&self) -> &[Dot] {
        &self.core.dots
    }

    pub fn dots_mut(&mut self) -> &mut Vec<Dot> {
        &mut self.core.dots
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.core.config
    }

    pub fn trials_completed(&self) -> usize {
        self.core.trials_completed
    }

    pub fn trials_total(&self) -> usize {
        self.core.trials_total
    }

    pub fn phase(&self) -> TrialPhase {
        self.core.phase
    }

    pub fn stationary(&self) -> Option<&StaticVariant> {
        match &self.variant {
            Variant::Static(v) => Some(v),
            Variant::Moving(_) => None,
        }
    }

    pub fn moving(&self) -> Option<&MovingVariant> {
        match &self.variant {
            Variant::Moving(v) => Some(v),
            Variant::Static(_) => None,
        }
    }

    pub fn moving_mut(&mut self) -> Option<&mut MovingVariant> {
        match &mut self.variant {
            Variant::Moving(v) => Some(v),
            Variant::Static(_) => None,
        }
    }

    /// Re-fits the experiment to `viewport`; moving dots get fresh trajectories.
    pub fn prepare(&mut self, viewport: Viewport) {
        self.core.viewport = viewport;
        self.variant.prepare(&mut self.core);
    }

    pub fn begin(&mut self) {
        if self.core.phase == TrialPhase::Idle {
            self.core.phase = TrialPhase::Running;
            info!(kind = ?self.kind(), trials = self.core.trials_total, "experiment started");
        }
    }

    /// Loads the next trial, or ends the experiment once every trial is done.
    /// The end is signalled only on the transition.
    pub fn next_trial<R: Rng>(&mut self, ctx: &mut TrialContext<'_, R>) -> Option<ExperimentEvent> {
        if self.core.trials_completed >= self.core.trials_total {
            if self.core.phase == TrialPhase::Ended {
                return None;
            }
            self.core.phase = TrialPhase::Ended;
            info!(trials = self.core.trials_completed, "experiment ended");
            return Some(ExperimentEvent::ExperimentEnd);
        }
        self.core.phase = TrialPhase::Running;
        self.core.trials_completed += 1;
        debug!(trial = self.core.trials_completed, total = self.core.trials_total, "next trial");
        self.variant.load_next_trial(&mut self.core, ctx);
        None
    }

    pub fn show_dots<R: Rng>(&mut self, subset: Option<&[usize]>, ctx: &mut TrialContext<'_, R>) {
        self.core.show_dots(subset, ctx);
        self.variant.after_show_dots(&mut self.core, subset, ctx);
    }

    pub fn hide_dots<R: Rng>(&mut self, subset: Option<&[usize]>, ctx: &mut TrialContext<'_, R>) {
        self.core.hide_dots(subset);
        self.variant.after_hide_dots(&mut self.core, ctx);
    }

    pub fn display_indicators<R: Rng>(&mut self, ctx: &mut TrialContext<'_, R>) {
        self.core.display_indicators(ctx);
        self.variant.after_display_indicators(&mut self.core, ctx);
    }

    pub fn hide_indicators<R: Rng>(&mut self, ctx: &mut TrialContext<'_, R>) {
        self.core.hide_indicators(ctx.validity);
    }

    pub fn randomize_dots<R: Rng>(&mut self, rng: &mut R) {
        self.core.randomize_dots(rng);
    }

    /// Runs the step a fired interval stands for.
    pub fn dispatch<R: Rng>(
        &mut self,
        event: &TrialEvent,
        ctx: &mut TrialContext<'_, R>,
    ) -> Option<ExperimentEvent> {
        match event {
            TrialEvent::NextTrial => return self.next_trial(ctx),
            TrialEvent::HideDots => self.hide_dots(None, ctx),
            TrialEvent::DisplayIndicators => self.display_indicators(ctx),
            TrialEvent::HideIndicators => self.hide_indicators(ctx),
            TrialEvent::StartRecording => ctx.media.start_recording(),
            TrialEvent::TakePicture => {
                let metadata = format!("{:.0}", ctx.scheduler.elapsed());
                ctx.media.take_picture(&metadata);
            }
        }
        None
    }

    /// Advances per-tick motion. Static experiments do nothing here.
    pub fn update(&mut self, dt: f64) -> Result<Vec<ExperimentEvent>, ExperimentError> {
        let events = self.variant.update(&mut self.core, dt)?;
        if events.contains(&ExperimentEvent::ExperimentEnd) {
            self.core.phase = TrialPhase::Ended;
        }
        Ok(events)
    }
}
