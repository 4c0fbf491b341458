use std::path::Path;

use dotex_core::{Dot, ExperimentKind};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Colors the renderer uses for an experiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: u8,
    pub background: u8,
    pub text_stroke_weight: f32,
    pub text_stroke_color: [u8; 3],
}

impl Style {
    pub const DEFAULT: Style = Style {
        fill: 0,
        background: 255,
        text_stroke_weight: 2.0,
        text_stroke_color: [255, 255, 255],
    };
    pub const BLACK_ON_GREY: Style = Style {
        fill: 0,
        background: 160,
        text_stroke_weight: 3.0,
        text_stroke_color: [255, 255, 255],
    };
    pub const GREY_ON_BLACK: Style = Style {
        fill: 208,
        background: 0,
        text_stroke_weight: 3.0,
        text_stroke_color: [0, 0, 0],
    };
}

impl Default for Style {
    fn default() -> Self {
        Style::DEFAULT
    }
}

/// Per-experiment parameters. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Trial interval; static experiments only.
    #[serde(default)]
    pub interval: Option<f64>,
    /// Remaining indicator budget; `None` is unbounded.
    #[serde(default)]
    pub indicator_count: Option<u32>,
    /// Upper bound of the uniform jitter added to each indicator delay.
    #[serde(default)]
    pub random_indicator_offset: f64,
    #[serde(default)]
    pub recording_delay: Option<f64>,
    #[serde(default)]
    pub snap_after_display: Option<f64>,
    #[serde(default)]
    pub style: Style,
}

fn default_trials() -> usize {
    10
}

impl ExperimentConfig {
    pub fn static_default() -> Self {
        Self {
            trials: default_trials(),
            interval: Some(4000.0),
            indicator_count: None,
            random_indicator_offset: 0.0,
            recording_delay: Some(300.0),
            snap_after_display: Some(200.0),
            style: Style::GREY_ON_BLACK,
        }
    }

    pub fn moving_default() -> Self {
        Self {
            trials: default_trials(),
            interval: None,
            indicator_count: Some(1),
            random_indicator_offset: 2000.0,
            recording_delay: None,
            snap_after_display: None,
            style: Style::BLACK_ON_GREY,
        }
    }

    pub fn validate(&self, kind: ExperimentKind) -> Result<(), ConfigError> {
        if kind == ExperimentKind::Static {
            if self.trials == 0 {
                return Err(ConfigError::Invalid(
                    "static experiment needs at least one trial".into(),
                ));
            }
            match self.interval {
                Some(interval) if interval > 0.0 => {}
                _ => {
                    return Err(ConfigError::Invalid(
                        "static experiment needs a positive interval".into(),
                    ));
                }
            }
        }
        if !(self.random_indicator_offset >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "random_indicator_offset must be non-negative, got {}",
                self.random_indicator_offset
            )));
        }
        Ok(())
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::static_default()
    }
}

/// One queued experiment of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExperimentSpec {
    Static {
        #[serde(default = "ExperimentConfig::static_default")]
        config: ExperimentConfig,
        #[serde(default = "default_static_dots")]
        dots: Vec<Dot>,
    },
    Moving {
        #[serde(default = "ExperimentConfig::moving_default")]
        config: ExperimentConfig,
        #[serde(default = "default_moving_dots")]
        dots: Vec<Dot>,
    },
}

fn default_static_dots() -> Vec<Dot> {
    vec![Dot::new(20.0, 20.0).with_visible(false)]
}

fn default_moving_dots() -> Vec<Dot> {
    vec![Dot::new(20.0, 20.0)]
}

impl ExperimentSpec {
    pub fn default_static() -> Self {
        ExperimentSpec::Static {
            config: ExperimentConfig::static_default(),
            dots: default_static_dots(),
        }
    }

    pub fn default_moving() -> Self {
        ExperimentSpec::Moving {
            config: ExperimentConfig::moving_default(),
            dots: default_moving_dots(),
        }
    }

    pub fn kind(&self) -> ExperimentKind {
        match self {
            ExperimentSpec::Static { .. } => ExperimentKind::Static,
            ExperimentSpec::Moving { .. } => ExperimentKind::Moving,
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        match self {
            ExperimentSpec::Static { config, .. } | ExperimentSpec::Moving { config, .. } => config,
        }
    }

    /// Checks the config and, for moving experiments, that every segment
    /// takes a positive, finite time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config().validate(self.kind())?;
        if let ExperimentSpec::Moving { dots, .. } = self {
            for (ix, dot) in dots.iter().enumerate() {
                if let Some(segment) = dot
                    .trajectory
                    .iter()
                    .find(|segment| !(segment.duration > 0.0 && segment.duration.is_finite()))
                {
                    return Err(ConfigError::Invalid(format!(
                        "dot {ix} has a segment with duration {}",
                        segment.duration
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub experiments: Vec<ExperimentSpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            experiments: vec![ExperimentSpec::default_moving(), ExperimentSpec::default_static()],
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.experiments.is_empty() {
            return Err(ConfigError::Invalid("session has no experiments".into()));
        }
        for spec in &self.experiments {
            spec.validate()?;
        }
        Ok(())
    }
}
