use dotex_core::{Dot, IndicatorSymbol, keycodes};
use rand::Rng;
use tracing::trace;

/// Stand-in for a participant: answers every indicator window once, after
/// a fixed reaction time, correctly with probability `accuracy`.
#[derive(Debug, Clone)]
pub struct SimulatedSubject<R> {
    accuracy: f64,
    latency: f64,
    rng: R,
    window_open: bool,
    pending: Option<(f64, u32)>,
}

impl<R: Rng> SimulatedSubject<R> {
    pub fn new(accuracy: f64, latency: f64, rng: R) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            latency: latency.max(0.0),
            rng,
            window_open: false,
            pending: None,
        }
    }

    /// Looks at the screen at session time `now` and returns the key pressed
    /// this frame, if any.
    pub fn observe(&mut self, now: f64, dots: &[Dot]) -> Option<u32> {
        let live = dots.iter().find(|dot| dot.indicator.is_live());
        match (live, self.window_open) {
            (Some(dot), false) => {
                self.window_open = true;
                let code = self.choose(dot.indicator.symbol);
                self.pending = Some((now + self.latency, code));
                trace!(now, code, "subject saw indicator");
            }
            (None, true) => {
                self.window_open = false;
                self.pending = None;
            }
            _ => {}
        }

        match self.pending {
            Some((due, code)) if now >= due => {
                self.pending = None;
                Some(code)
            }
            _ => None,
        }
    }

    fn choose(&mut self, symbol: IndicatorSymbol) -> u32 {
        if self.rng.random_bool(self.accuracy) {
            symbol.code()
        } else if symbol.code() == keycodes::ARROW_LEFT {
            keycodes::ARROW_RIGHT
        } else {
            keycodes::ARROW_LEFT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotex_core::colors;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn live(symbol: IndicatorSymbol) -> Dot {
        let mut dot = Dot::new(0.0, 0.0);
        dot.indicator.symbol = symbol;
        dot.indicator.color = colors::WHITE;
        dot
    }

    #[test]
    fn answers_once_after_latency() {
        let mut subject = SimulatedSubject::new(1.0, 100.0, StdRng::seed_from_u64(5));
        let dots = vec![live(IndicatorSymbol::Right)];
        assert_eq!(subject.observe(0.0, &dots), None);
        assert_eq!(subject.observe(50.0, &dots), None);
        assert_eq!(subject.observe(100.0, &dots), Some(keycodes::ARROW_RIGHT));
        assert_eq!(subject.observe(150.0, &dots), None);
    }

    #[test]
    fn missed_window_is_dropped() {
        let mut subject = SimulatedSubject::new(1.0, 100.0, StdRng::seed_from_u64(5));
        subject.observe(0.0, &[live(IndicatorSymbol::Left)]);
        assert_eq!(subject.observe(50.0, &[Dot::new(0.0, 0.0)]), None);
        assert_eq!(subject.observe(200.0, &[Dot::new(0.0, 0.0)]), None);
    }

    #[test]
    fn zero_accuracy_always_misses() {
        let mut subject = SimulatedSubject::new(0.0, 0.0, StdRng::seed_from_u64(5));
        let dots = vec![live(IndicatorSymbol::Left)];
        assert_eq!(subject.observe(0.0, &dots), Some(keycodes::ARROW_RIGHT));
    }
}
