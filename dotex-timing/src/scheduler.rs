use string_cache::DefaultAtom;
use tracing::trace;

/// Interval names are interned; every tick snapshots them.
pub type IntervalName = DefaultAtom;

/// A named, delay-based scheduled event
#[derive(Debug, Clone, PartialEq)]
pub struct Interval<E> {
    pub name: IntervalName,
    pub time_left: f64,
    pub delay: f64,
    pub repeat: bool,
    pub event: E,
}

/// Single source of elapsed time and named callbacks for an experiment.
///
/// Scheduled work is data: each interval carries an event of type `E`, and
/// `tick` hands due events to the caller's handler together with the
/// scheduler itself so the handler may add or remove intervals.
///
/// Time only moves through `tick`, with a caller-supplied `dt`. A delay
/// smaller than `dt` can not fire more than once per tick.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    // insertion ordered; replacing a name keeps its slot
    intervals: Vec<Interval<E>>,
    elapsed: f64,
    running: bool,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<E> Scheduler<E> {
    pub fn new(running: bool) -> Self {
        Self {
            intervals: Vec::new(),
            elapsed: 0.0,
            running,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Cumulative time advanced while running.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Registers `event` to fire after `delay`. An interval already registered
    /// under `name` is replaced, not kept alongside.
    pub fn add_interval(
        &mut self,
        name: impl Into<IntervalName>,
        delay: f64,
        event: E,
        repeat: bool,
    ) {
        let interval = Interval {
            name: name.into(),
            time_left: delay,
            delay,
            repeat,
            event,
        };
        match self.position(&interval.name) {
            Some(ix) => self.intervals[ix] = interval,
            None => self.intervals.push(interval),
        }
    }

    /// Drops the interval if present.
    pub fn remove_interval(&mut self, name: &str) {
        self.intervals.retain(|interval| &*interval.name != name);
    }

    pub fn clear_intervals(&mut self) {
        self.intervals.clear();
    }

    pub fn interval(&self, name: &str) -> Option<&Interval<E>> {
        self.intervals.iter().find(|interval| &*interval.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interval(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Advances time by `dt` and fires every interval that became due.
    ///
    /// Only intervals present when the tick began are processed. Intervals the
    /// handler adds wait for the next tick; intervals it removes are skipped.
    ///
    /// A due one-shot interval is removed, and a due repeating one
    /// rescheduled, before `handler` sees its event. A handler that re-adds
    /// the name it was called for therefore replaces that registration and
    /// the new one survives the tick.
    pub fn tick<F>(&mut self, dt: f64, mut handler: F)
    where
        E: Clone,
        F: FnMut(&mut Self, &E),
    {
        if !self.running {
            return;
        }
        self.elapsed += dt;

        let names: Vec<IntervalName> = self.intervals.iter().map(|i| i.name.clone()).collect();
        for name in names {
            let Some(ix) = self.position(&name) else {
                continue;
            };
            let interval = &mut self.intervals[ix];
            if interval.time_left > 0.0 {
                interval.time_left -= dt;
            }
            if interval.time_left > 0.0 {
                continue;
            }

            let event = interval.event.clone();
            if interval.repeat {
                // carry the overshoot so the long-run cadence holds
                interval.time_left += interval.delay;
            } else {
                self.intervals.remove(ix);
            }
            trace!(interval = %name, elapsed = self.elapsed, "interval fired");
            handler(self, &event);
        }
    }

    fn position(&self, name: &IntervalName) -> Option<usize> {
        self.intervals.iter().position(|interval| &interval.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(scheduler: &mut Scheduler<&'static str>, dt: f64) -> Vec<&'static str> {
        let mut fired = Vec::new();
        scheduler.tick(dt, |_, event| fired.push(*event));
        fired
    }

    #[test]
    fn starts_at_zero_and_advances_while_running() {
        let mut scheduler: Scheduler<()> = Scheduler::default();
        assert_eq!(scheduler.elapsed(), 0.0);
        scheduler.tick(1.0, |_, _| {});
        assert_eq!(scheduler.elapsed(), 1.0);

        scheduler.stop();
        assert!(!scheduler.is_running());
        scheduler.tick(5.0, |_, _| {});
        assert_eq!(scheduler.elapsed(), 1.0);

        scheduler.start();
        scheduler.tick(2.0, |_, _| {});
        assert_eq!(scheduler.elapsed(), 3.0);
    }

    #[test]
    fn half_delay_ticks_fire_once() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("cue", 10.0, "cue", false);
        assert!(collect(&mut scheduler, 5.0).is_empty());
        assert_eq!(collect(&mut scheduler, 5.0), vec!["cue"]);
        assert!(collect(&mut scheduler, 5.0).is_empty());
        assert!(!scheduler.contains("cue"));
    }

    #[test]
    fn repeating_interval_fires_on_the_delay_tick() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("test123", 2.0, "test123", true);
        assert!(collect(&mut scheduler, 1.0).is_empty());
        assert_eq!(collect(&mut scheduler, 1.0), vec!["test123"]);
        assert!(collect(&mut scheduler, 1.0).is_empty());
        assert_eq!(collect(&mut scheduler, 1.0), vec!["test123"]);
    }

    #[test]
    fn repeat_carries_overshoot_forward() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("beat", 10.0, "beat", true);
        assert!(collect(&mut scheduler, 7.0).is_empty());
        // due at 10, fired at 14: next one at 20
        assert_eq!(collect(&mut scheduler, 7.0), vec!["beat"]);
        assert_eq!(scheduler.interval("beat").unwrap().time_left, 6.0);
        assert!(collect(&mut scheduler, 5.0).is_empty());
        assert_eq!(collect(&mut scheduler, 1.0), vec!["beat"]);
    }

    #[test]
    fn removed_interval_never_fires() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("test123", 2.0, "test123", true);
        scheduler.tick(1.0, |_, _| {});
        scheduler.remove_interval("test123");
        assert!(collect(&mut scheduler, 1.0).is_empty());
        // unknown names are fine
        scheduler.remove_interval("missing");
    }

    #[test]
    fn one_shot_and_repeating_side_by_side() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("testRepeat", 4.0, "testRepeat", true);
        scheduler.add_interval("testOnce", 2.0, "testOnce", false);
        collect(&mut scheduler, 1.0);
        assert_eq!(collect(&mut scheduler, 1.0), vec!["testOnce"]);
        assert!(collect(&mut scheduler, 1.0).is_empty());
        scheduler.remove_interval("testRepeat");
        assert!(collect(&mut scheduler, 1.0).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn re_adding_a_name_replaces_it() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("a", 1.0, "first", false);
        scheduler.add_interval("b", 1.0, "b", false);
        scheduler.add_interval("a", 3.0, "second", false);
        assert_eq!(scheduler.len(), 2);
        assert_eq!(collect(&mut scheduler, 1.0), vec!["b"]);
        assert!(collect(&mut scheduler, 1.0).is_empty());
        assert_eq!(collect(&mut scheduler, 1.0), vec!["second"]);
    }

    #[test]
    fn intervals_added_during_tick_wait_for_next_tick() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("spawner", 1.0, "spawner", false);
        let mut fired = Vec::new();
        scheduler.tick(1.0, |scheduler, event| {
            fired.push(*event);
            scheduler.add_interval("child", 0.0, "child", false);
        });
        assert_eq!(fired, vec!["spawner"]);
        assert_eq!(collect(&mut scheduler, 1.0), vec!["child"]);
    }

    #[test]
    fn removal_during_tick_suppresses_due_fire() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("first", 1.0, "first", false);
        scheduler.add_interval("second", 1.0, "second", false);
        let mut fired = Vec::new();
        scheduler.tick(1.0, |scheduler, event| {
            fired.push(*event);
            scheduler.remove_interval("second");
        });
        assert_eq!(fired, vec!["first"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn handler_may_reschedule_its_own_name() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("again", 1.0, "again", false);
        scheduler.tick(1.0, |scheduler, _| {
            scheduler.add_interval("again", 2.0, "again", false);
        });
        assert_eq!(scheduler.interval("again").unwrap().time_left, 2.0);
    }

    #[test]
    fn handler_sees_interval_already_rescheduled() {
        let mut scheduler = Scheduler::default();
        scheduler.add_interval("beat", 4.0, "beat", true);
        scheduler.add_interval("once", 4.0, "once", false);
        let mut seen = Vec::new();
        scheduler.tick(5.0, |scheduler, event| {
            seen.push((*event, scheduler.interval(event).map(|i| i.time_left)));
        });
        assert_eq!(seen, vec![("beat", Some(3.0)), ("once", None)]);
    }

    proptest! {
        #[test]
        fn elapsed_is_frozen_while_stopped(
            steps in proptest::collection::vec((0.0f64..50.0, any::<bool>()), 1..64),
        ) {
            let mut scheduler: Scheduler<()> = Scheduler::default();
            let mut expected = 0.0;
            for (dt, running) in steps {
                if running { scheduler.start() } else { scheduler.stop() }
                let before = scheduler.elapsed();
                scheduler.tick(dt, |_, _| {});
                if running {
                    expected += dt;
                    prop_assert!(scheduler.elapsed() >= before);
                } else {
                    prop_assert_eq!(scheduler.elapsed().to_bits(), before.to_bits());
                }
                prop_assert_eq!(scheduler.elapsed().to_bits(), expected.to_bits());
            }
        }
    }
}
