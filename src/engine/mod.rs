//! Prediction engine.
//!
//! Stat aggregation and the sequential request pipeline.

pub mod aggregator;
pub mod pipeline;
