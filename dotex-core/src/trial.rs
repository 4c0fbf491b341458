use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of a single experiment's trial sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialPhase {
    #[default]
    Idle,
    Running,
    Ended,
}

/// Recorded outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub x: f64,
    pub y: f64,
    pub answer_correct: bool,
}

/// Per-trial results keyed by trial index.
pub type TrialResults = BTreeMap<usize, TrialResult>;
