//! Time-series utilities shared by the normalizer and the pipeline.
//!
//! Modules include:
//! - `infer`: infer the native cadence of a date sequence
//! - `resample`: re-express a series at a target frequency with bounded forward fill
//! - `merge`: align resampled series on one complete date index
//! - `util`: change ratios, tolerance checks, contiguity invariants
/// Cadence inference helpers.
pub mod infer;
/// Panel alignment.
pub mod merge;
/// Frequency conversion with aggregation and bounded fill.
pub mod resample;
pub mod util;
