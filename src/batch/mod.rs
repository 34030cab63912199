mod config;
mod runner;
mod stats;

pub use config::{AggregationConfig, AngleGroup, BatchConfig};
pub use runner::{BatchRunner, FileOutcome, GroupResult};
pub use stats::{
    AngleStatistics, WrapPolicy, circular_mean_degrees, circular_std_degrees,
    mean_resultant_length, summarize,
};
