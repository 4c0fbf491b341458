pub mod clock;
pub mod scheduler;

pub use clock::{Clock, FrameClock, FrameStats};
pub use scheduler::{Interval, IntervalName, Scheduler};
