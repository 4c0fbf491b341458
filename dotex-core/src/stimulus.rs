use serde::{Deserialize, Serialize};

/// RGBA, alpha last. An indicator is live for response matching iff alpha != 0.
pub type Color = [u8; 4];

pub mod colors {
    use super::Color;

    pub const RED: Color = [255, 0, 0, 255];
    pub const GREEN: Color = [0, 255, 0, 255];
    pub const WHITE: Color = [255, 255, 255, 255];
    pub const INVISIBLE: Color = [0, 0, 0, 0];
}

/// Key codes delivered by the input source.
pub mod keycodes {
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;

    pub fn is_arrow(code: u32) -> bool {
        code == ARROW_LEFT || code == ARROW_RIGHT
    }
}

/// Directional symbol shown on top of a dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndicatorSymbol {
    #[default]
    #[serde(rename = "←")]
    Left,
    #[serde(rename = "→")]
    Right,
}

impl IndicatorSymbol {
    pub const ALL: [IndicatorSymbol; 2] = [IndicatorSymbol::Left, IndicatorSymbol::Right];

    /// Key code the subject must press for this symbol.
    pub fn code(self) -> u32 {
        match self {
            IndicatorSymbol::Left => keycodes::ARROW_LEFT,
            IndicatorSymbol::Right => keycodes::ARROW_RIGHT,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            keycodes::ARROW_LEFT => Some(IndicatorSymbol::Left),
            keycodes::ARROW_RIGHT => Some(IndicatorSymbol::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Indicator {
    pub symbol: IndicatorSymbol,
    pub size: f32,
    /// ms between showing the dot and showing the indicator
    pub delay: f64,
    /// ms the indicator stays up
    pub display_time: f64,
    pub color: Color,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            symbol: IndicatorSymbol::Left,
            size: 20.0,
            delay: 1000.0,
            display_time: 2000.0,
            color: [255, 255, 255, 0],
        }
    }
}

impl Indicator {
    pub fn is_live(&self) -> bool {
        self.color[3] != 0
    }
}

/// Pulse animation targets. Animated by the renderer; the core only reads `target_r`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pulse {
    pub r: f64,
    pub target_r: f64,
    pub stroke_weight: f32,
    pub target_stroke_weight: f32,
    pub opacity: u8,
    pub target_opacity: u8,
    pub period: f64,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            r: 18.0,
            target_r: 50.0,
            stroke_weight: 1.0,
            target_stroke_weight: 5.0,
            opacity: 255,
            target_opacity: 1,
            period: 300.0,
        }
    }
}

/// One leg of a piecewise-linear trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// ms
    pub duration: f64,
}

impl Segment {
    /// Per-axis speed in px/ms.
    pub fn velocity(&self) -> (f64, f64) {
        (
            (self.end_x - self.start_x) / self.duration,
            (self.end_y - self.start_y) / self.duration,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Viewport shrunk by `margin` on the far edges.
    pub fn inset(&self, margin: f64) -> Self {
        Self {
            width: self.width - margin,
            height: self.height - margin,
        }
    }
}

/// A stimulus dot. Created once per experiment and repositioned between trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub pulsate: bool,
    pub visible: bool,
    pub indicator: Indicator,
    pub pulse: Pulse,
    pub trajectory: Vec<Segment>,
}

impl Default for Dot {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Dot {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            r: 18.0,
            pulsate: true,
            visible: true,
            indicator: Indicator::default(),
            pulse: Pulse::default(),
            trajectory: Vec::new(),
        }
    }

    pub fn with_radius(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_trajectory(mut self, trajectory: Vec<Segment>) -> Self {
        self.trajectory = trajectory;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_defaults() {
        let dot = Dot::new(10.0, 20.0).with_radius(50.0);
        assert_eq!((dot.x, dot.y, dot.r), (10.0, 20.0, 50.0));
        assert!(dot.pulsate);
        assert!(dot.visible);
        assert!(!dot.indicator.is_live());
        assert!(dot.trajectory.is_empty());
    }

    #[test]
    fn symbols_map_to_arrow_keys() {
        assert_eq!(IndicatorSymbol::Left.code(), 37);
        assert_eq!(IndicatorSymbol::Right.code(), 39);
        assert_eq!(IndicatorSymbol::from_code(39), Some(IndicatorSymbol::Right));
        assert_eq!(IndicatorSymbol::from_code(40), None);
        assert!(!keycodes::is_arrow(32));
    }

    #[test]
    fn dot_deserializes_with_partial_fields() {
        let dot: Dot =
            serde_json::from_str(r#"{"x": 3.0, "indicator": {"symbol": "→"}}"#).unwrap();
        assert_eq!(dot.x, 3.0);
        assert_eq!(dot.r, 18.0);
        assert_eq!(dot.indicator.symbol, IndicatorSymbol::Right);
        assert_eq!(dot.indicator.display_time, 2000.0);
    }
}
