use dotex_core::{Dot, Segment};
use tracing::{debug, warn};

use crate::error::ExperimentError;
use crate::state::{ExperimentCore, ExperimentEvent, TrialHooks};
use crate::trajectory::{DEFAULT_BOUNCES, DEFAULT_TOTAL_TIME, generate_zigzag};

/// Gap kept between a prepared trajectory and the viewport's far edges, in px.
pub const TRAJECTORY_MARGIN: f64 = 40.0;

/// Where a dot is along its trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryCursor {
    pub trajectory: Vec<Segment>,
    pub segment_ix: usize,
    pub finished: bool,
}

impl TrajectoryCursor {
    pub fn new(trajectory: Vec<Segment>) -> Self {
        Self {
            trajectory,
            segment_ix: 0,
            finished: false,
        }
    }
}

/// A dot travelling along a piecewise-linear path, advanced on every tick.
#[derive(Debug, Clone, Default)]
pub struct MovingVariant {
    cursors: Vec<Option<TrajectoryCursor>>,
}

impl MovingVariant {
    pub fn new(dots: &[Dot]) -> Self {
        Self {
            cursors: dots
                .iter()
                .map(|dot| Some(TrajectoryCursor::new(dot.trajectory.clone())))
                .collect(),
        }
    }

    /// (Re)starts dot `ix` at the beginning of its trajectory.
    pub fn add_dot_trajectory(&mut self, ix: usize, dot: &Dot) {
        if self.cursors.len() <= ix {
            self.cursors.resize(ix + 1, None);
        }
        self.cursors[ix] = Some(TrajectoryCursor::new(dot.trajectory.clone()));
    }

    pub fn remove_dot_trajectory(&mut self, ix: usize) {
        if let Some(cursor) = self.cursors.get_mut(ix) {
            *cursor = None;
        }
    }

    pub fn cursor(&self, ix: usize) -> Option<&TrajectoryCursor> {
        self.cursors.get(ix).and_then(Option::as_ref)
    }

    /// Moves every dot by `dt` along its current segment, rolling over onto
    /// the next segment when the boundary is crossed.
    pub fn advance(
        &mut self,
        dots: &mut [Dot],
        dt: f64,
    ) -> Result<Vec<ExperimentEvent>, ExperimentError> {
        if let Some(dot) = (0..dots.len()).find(|&ix| self.cursor(ix).is_none()) {
            return Err(ExperimentError::MissingCursor { dot });
        }

        let mut events = Vec::new();
        for (ix, (dot, cursor)) in dots.iter_mut().zip(self.cursors.iter_mut()).enumerate() {
            let Some(cursor) = cursor.as_mut() else {
                continue;
            };
            if cursor.finished {
                continue;
            }
            let Some(&segment) = cursor.trajectory.get(cursor.segment_ix) else {
                warn!(dot = ix, "dot has an empty trajectory");
                cursor.finished = true;
                continue;
            };

            let excess = if segment.duration > 0.0 {
                let (vx, vy) = segment.velocity();
                let (dx, dy) = (vx * dt, vy * dt);
                if !reached_end_of_segment(dot, dx, dy, &segment) {
                    dot.x += dx;
                    dot.y += dy;
                    continue;
                }
                excess_time(dot, dx, dy, dt, &segment)
            } else {
                // a segment without duration is crossed instantly
                dot.x = segment.end_x;
                dot.y = segment.end_y;
                dt
            };

            match cursor.trajectory.get(cursor.segment_ix + 1) {
                Some(next) => {
                    cursor.segment_ix += 1;
                    if next.duration > 0.0 {
                        let (vx, vy) = next.velocity();
                        dot.x += vx * excess;
                        dot.y += vy * excess;
                    }
                    debug!(dot = ix, segment = cursor.segment_ix, excess, "next segment");
                }
                None => {
                    cursor.finished = true;
                    debug!(dot = ix, "path end");
                    events.push(ExperimentEvent::PathEnd);
                    events.push(ExperimentEvent::ExperimentEnd);
                }
            }
        }
        Ok(events)
    }
}

impl TrialHooks for MovingVariant {
    fn update(
        &mut self,
        core: &mut ExperimentCore,
        dt: f64,
    ) -> Result<Vec<ExperimentEvent>, ExperimentError> {
        self.advance(&mut core.dots, dt)
    }

    fn prepare(&mut self, core: &mut ExperimentCore) {
        let area = core.viewport.inset(TRAJECTORY_MARGIN);
        for (ix, dot) in core.dots.iter_mut().enumerate() {
            dot.trajectory =
                generate_zigzag(area.width, area.height, DEFAULT_BOUNCES, DEFAULT_TOTAL_TIME);
            dot.visible = true;
            self.add_dot_trajectory(ix, dot);
        }
    }
}

/// True iff moving by `(dx, dy)` puts the dot at or past the segment's
/// range on both axes. An axis whose start equals its end always qualifies.
pub fn reached_end_of_segment(dot: &Dot, dx: f64, dy: f64, segment: &Segment) -> bool {
    let x = dot.x + dx;
    let y = dot.y + dy;
    let at_end_x =
        x >= segment.start_x.max(segment.end_x) || x <= segment.start_x.min(segment.end_x);
    let at_end_y =
        y >= segment.start_y.max(segment.end_y) || y <= segment.start_y.min(segment.end_y);
    at_end_x && at_end_y
}

/// Part of `dt` left after the dot reaches the segment end, assuming it
/// travels `(dx, dy)` at constant speed. Zero if the end is not reached.
pub fn excess_time(dot: &Dot, dx: f64, dy: f64, dt: f64, segment: &Segment) -> f64 {
    let dist = (dx * dx + dy * dy).sqrt();
    let left_x = segment.end_x - dot.x;
    let left_y = segment.end_y - dot.y;
    let dist_left = (left_x * left_x + left_y * left_y).sqrt();
    if dist == 0.0 || dist < dist_left {
        return 0.0;
    }
    let speed = dist / dt;
    (dist - dist_left) / speed
}
