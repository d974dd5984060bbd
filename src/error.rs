use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Grid size mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    SizeMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Rectangle ({x}, {y}, {width}x{height}) out of bounds for {limit_width}x{limit_height} area")]
    RectangleOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        limit_width: usize,
        limit_height: usize,
    },

    #[error("Value {0} has a magnitude greater than one and cannot be encoded")]
    ValueOutOfRange(f64),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
