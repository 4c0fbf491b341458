use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    /// `update` reached a dot that never had its trajectory added.
    #[error("dot {dot} has no trajectory cursor; was the moving experiment prepared?")]
    MissingCursor { dot: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode statistics: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}
