/// Errors surfaced by configuration loading, training and plotting.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The loss overflowed or became NaN.  Training stops; nothing is rolled back.
    #[error("loss became non-finite ({loss}) at step {step}")]
    NonFiniteLoss { step: usize, loss: f64 },
}

pub type Result<T> = std::result::Result<T, TrainError>;
