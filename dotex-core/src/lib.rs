pub mod phase;
pub mod stimulus;
pub mod trial;

pub use phase::{ExperimentKind, SessionPhase};
pub use stimulus::{
    Color, Dot, Indicator, IndicatorSymbol, Pulse, Segment, Viewport, colors, keycodes,
};
pub use trial::{TrialPhase, TrialResult, TrialResults};
