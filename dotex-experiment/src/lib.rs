pub mod config;
pub mod error;
pub mod media;
pub mod moving;
pub mod session;
pub mod state;
pub mod stationary;
pub mod trajectory;
pub mod validity;
pub use config::{ExperimentConfig, ExperimentSpec, SessionConfig, Style};
pub use error::{ConfigError, ExperimentError, UploadError};
pub use media::{
    MediaCall, MediaCapture, MemoryUploader, NullMedia, RecordingMedia, StatisticsUploader,
};
pub use moving::{MovingVariant, TrajectoryCursor, excess_time, reached_end_of_segment};
pub use session::{Session, SessionResult};
pub use state::{
    DotExperiment, ExperimentCore, ExperimentEvent, TrialContext, TrialEvent, TrialHooks,
};
pub use stationary::StaticVariant;
pub use trajectory::generate_zigzag;
pub use validity::ValidityTracker;
