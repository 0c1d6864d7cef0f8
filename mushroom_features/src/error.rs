use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error(
        "HOG geometry does not fit a {width}x{height} image: {block_size}x{block_size} blocks of {cell_size}px cells"
    )]
    HogGeometry {
        width: u32,
        height: u32,
        cell_size: u32,
        block_size: usize,
    },
    #[error("Invalid feature configuration: {0}")]
    InvalidConfig(String),
    #[error("Feature vector has {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
