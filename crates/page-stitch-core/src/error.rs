use thiserror::Error;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Expected exactly {expected} images, got {actual}")]
    WrongImageCount { expected: usize, actual: usize },
    #[error("Downscale factor must be in (0, 1], got {0}")]
    InvalidDownscale(f32),
    #[error("Encoding error: {0}")]
    Encode(String),
    #[error("Nothing to compose")]
    Empty,
}

pub type Result<T> = std::result::Result<T, StitchError>;
