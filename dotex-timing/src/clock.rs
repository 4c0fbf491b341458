use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Wall-clock source for hosts that drive the scheduler in real time
pub trait Clock {
    type Timestamp: Copy;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn frame_stats(&self) -> FrameStats;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Measures per-frame `dt` and paces the frame loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Option<u64>,
    frame_times: VecDeque<Duration>,
    max_samples: usize,
}

impl Clock for FrameClock {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&self, d: Duration) {
        #[cfg(target_os = "linux")]
        linux_sleep(d);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(d);
    }

    fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(d);
    }

    fn frame_stats(&self) -> FrameStats {
        if self.frame_times.is_empty() {
            return FrameStats::default();
        }
        let times = self.frame_times.iter().map(|d| d.as_nanos() as f64);
        let n = self.frame_times.len() as f64;
        let avg = times.clone().sum::<f64>() / n;
        let var = times.clone().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        let min = times.clone().fold(f64::INFINITY, f64::min);
        let max = times.fold(f64::NEG_INFINITY, f64::max);
        FrameStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_frame: None,
            frame_times: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    /// Milliseconds since the previous call; 0 on the first.
    pub fn frame_delta_ms(&mut self) -> f64 {
        let now = self.now();
        let delta = match self.last_frame.replace(now) {
            Some(prev) => Duration::from_nanos(now.saturating_sub(prev)),
            None => return 0.0,
        };
        self.record_frame(delta);
        delta.as_secs_f64() * 1e3
    }

    /// Sleeps out whatever is left of a frame that began at `frame_start`.
    pub fn pace(&self, frame_start: u64, frame_time: Duration) {
        let spent = self.elapsed(frame_start);
        if let Some(rest) = frame_time.checked_sub(spent) {
            self.sleep(rest);
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn linux_sleep(duration: Duration) {
    use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_are_zero_without_frames() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_stats(), FrameStats::default());
    }

    #[test]
    fn stats_over_recorded_frames() {
        let mut clock = FrameClock::new();
        clock.record_frame(Duration::from_millis(10));
        clock.record_frame(Duration::from_millis(30));
        let stats = clock.frame_stats();
        assert_eq!(stats.average_frame_time_ns, 20e6);
        assert_eq!(stats.jitter_ns, 10e6);
        assert_eq!(stats.min_frame_time_ns, 10e6);
        assert_eq!(stats.max_frame_time_ns, 30e6);
        assert_eq!(stats.effective_fps, 50.0);
    }

    #[test]
    fn first_delta_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame_delta_ms(), 0.0);
        clock.sleep(Duration::from_millis(2));
        assert!(clock.frame_delta_ms() >= 2.0);
    }
}
