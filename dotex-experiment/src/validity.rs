use dotex_core::{Dot, TrialResult, TrialResults, colors};
use tracing::debug;

use crate::media::MediaCapture;

/// Scores directional responses against the live indicators.
///
/// Only one response is evaluated per indicator window; `reset_input_test`
/// opens the next window.
#[derive(Debug, Clone, Default)]
pub struct ValidityTracker {
    pub score: usize,
    pub tests: usize,
    pub per_dot_results: TrialResults,
    input_tested: bool,
}

impl ValidityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `code` against every dot whose indicator is live and returns the
    /// number of matches, or `None` if this window was already evaluated.
    ///
    /// `tests` counts every dot, live or not.
    pub fn check_validity(
        &mut self,
        dots: &mut [Dot],
        trial: usize,
        code: u32,
        media: &mut dyn MediaCapture,
    ) -> Option<usize> {
        if self.input_tested {
            return None;
        }
        self.input_tested = true;

        let mut valid = 0;
        for dot in dots.iter_mut() {
            if dot.indicator.is_live() {
                let correct = dot.indicator.symbol.code() == code;
                if correct {
                    valid += 1;
                    dot.indicator.color = colors::GREEN;
                } else {
                    dot.indicator.color = colors::RED;
                    media.clear_buffer();
                }
                self.per_dot_results.insert(
                    trial,
                    TrialResult {
                        x: dot.x,
                        y: dot.y,
                        answer_correct: correct,
                    },
                );
            }
            self.tests += 1;
        }
        self.score += valid;
        debug!(trial, code, valid, score = self.score, tests = self.tests, "response checked");
        Some(valid)
    }

    pub fn reset_input_test(&mut self) {
        self.input_tested = false;
    }

    pub fn input_tested(&self) -> bool {
        self.input_tested
    }

    /// Records a miss for `trial` unless a response is already on file.
    pub fn record_missed(&mut self, trial: usize, dot: &Dot) {
        self.per_dot_results.entry(trial).or_insert(TrialResult {
            x: dot.x,
            y: dot.y,
            answer_correct: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaCall, NullMedia, RecordingMedia};
    use dotex_core::{IndicatorSymbol, keycodes};

    fn live_dot() -> Dot {
        let mut dot = Dot::new(1.0, 7.0);
        dot.indicator.color = colors::WHITE;
        dot
    }

    #[test]
    fn input_test_resets() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot()];
        assert!(!vm.input_tested());
        vm.check_validity(&mut dots, 0, 21, &mut NullMedia);
        assert!(vm.input_tested());
        vm.reset_input_test();
        assert!(!vm.input_tested());
    }

    #[test]
    fn validates_input() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot()];

        assert_eq!(vm.check_validity(&mut dots, 0, keycodes::ARROW_LEFT, &mut NullMedia), Some(1));
        assert_eq!((vm.score, vm.tests), (1, 1));

        vm.reset_input_test();
        assert_eq!(vm.check_validity(&mut dots, 0, 36, &mut NullMedia), Some(0));
        assert_eq!((vm.score, vm.tests), (1, 2));

        dots[0].indicator.symbol = IndicatorSymbol::Right;
        vm.reset_input_test();
        assert_eq!(vm.check_validity(&mut dots, 0, keycodes::ARROW_RIGHT, &mut NullMedia), Some(1));
        assert_eq!((vm.score, vm.tests), (2, 3));
    }

    #[test]
    fn marks_indicator_color() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot()];
        dots[0].indicator.symbol = IndicatorSymbol::Right;
        let mut media = RecordingMedia::default();

        vm.check_validity(&mut dots, 0, keycodes::ARROW_RIGHT, &mut media);
        assert_eq!(dots[0].indicator.color, colors::GREEN);
        assert!(media.calls.is_empty());

        vm.reset_input_test();
        vm.check_validity(&mut dots, 0, keycodes::ARROW_LEFT, &mut media);
        assert_eq!(dots[0].indicator.color, colors::RED);
        assert_eq!(media.calls, vec![MediaCall::ClearBuffer]);
    }

    #[test]
    fn repeated_input_in_one_window_is_ignored() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot()];
        dots[0].indicator.symbol = IndicatorSymbol::Right;

        vm.check_validity(&mut dots, 0, keycodes::ARROW_RIGHT, &mut NullMedia);
        assert_eq!((vm.score, vm.tests), (1, 1));
        assert_eq!(vm.check_validity(&mut dots, 0, 40, &mut NullMedia), None);
        assert_eq!((vm.score, vm.tests), (1, 1));
        assert_eq!(dots[0].indicator.color, colors::GREEN);
    }

    #[test]
    fn hidden_indicators_count_as_tests_only() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot(), Dot::new(5.0, 5.0)];

        assert_eq!(vm.check_validity(&mut dots, 3, keycodes::ARROW_LEFT, &mut NullMedia), Some(1));
        assert_eq!((vm.score, vm.tests), (1, 2));
        assert_eq!(dots[1].indicator.color, [255, 255, 255, 0]);
        assert!(vm.per_dot_results[&3].answer_correct);
    }

    #[test]
    fn missed_response_does_not_overwrite_answer() {
        let mut vm = ValidityTracker::new();
        let mut dots = vec![live_dot()];
        vm.check_validity(&mut dots, 1, keycodes::ARROW_LEFT, &mut NullMedia);
        vm.record_missed(1, &dots[0]);
        vm.record_missed(2, &dots[0]);
        assert!(vm.per_dot_results[&1].answer_correct);
        assert!(!vm.per_dot_results[&2].answer_correct);
        assert_eq!(vm.per_dot_results[&2].x, 1.0);
    }
}
