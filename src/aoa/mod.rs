pub mod estimator;
pub mod geometry;

pub use estimator::{AngleAnalysis, AngleEstimator, estimate_angle};
pub use geometry::{AngleEstimate, AoaResolver, ArrayGeometry, triangulation_terms};
