pub mod butterworth;
pub mod conditioner;
pub mod correlation;
pub mod math;
pub mod resample;

pub use butterworth::{BandpassDesign, BandpassFilter, FilterSpec};
pub use conditioner::ChannelConditioner;
pub use correlation::{
    CorrelationPoint, CorrelationResult, DelayTriple, PairCorrelations, cross_correlate,
    estimate_delay,
};
pub use math::{angle_error, normalize_degrees, radians_to_bearing};
pub use resample::upsample;
