//! Sensor normalization (SDR rows -> canonical readings).

pub mod normalizer;

pub use normalizer::normalize;
