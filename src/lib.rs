//! Club football match predictor.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod error;
pub mod types;
pub mod leagues;
pub mod data;
pub mod llm;
pub mod engine;
pub mod session;
pub mod web;
