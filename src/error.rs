use thiserror::Error;

#[derive(Error, Debug)]
pub enum AoaError {
    #[error("Malformed recording: {0}")]
    MalformedRecording(String),

    #[error("Invalid filter specification: {0}")]
    InvalidFilterSpec(String),

    #[error(
        "Degenerate geometry: delays give numerator {numerator:.3e} and denominator {denominator:.3e}, bearing is undefined"
    )]
    DegenerateGeometry { numerator: f64, denominator: f64 },

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AoaError>;
