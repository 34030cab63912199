pub mod aoa;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod recording;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use aoa::{AngleEstimate, AngleEstimator, estimate_angle};
pub use config::EstimatorConfig;
pub use error::{AoaError, Result};
pub use recording::Recording;
pub use wav::save_wav;
