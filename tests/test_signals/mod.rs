#![allow(dead_code)]

pub mod generate;

pub use generate::{
    ADC_BIAS, MIC_CHANNELS, NUM_CHANNELS, SAMPLE_RATE_HZ, burst, reference_recording,
    shifted_recording, write_recording,
};
