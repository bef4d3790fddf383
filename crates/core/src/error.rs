/// Result alias that carries the custom [`VjError`] type.
pub type Result<T> = std::result::Result<T, VjError>;

/// Common error type for the core crate.
///
/// The animation core itself never fails; these variants cover the edges of
/// the system (configuration, input scripts and frame recording).
#[derive(Debug, thiserror::Error)]
pub enum VjError {
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a configuration file or input script.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Failure while encoding or saving a recorded frame.
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input script: {0}")]
    InvalidScript(String),
}
