//! Core generation logic: job types, parsing, geometry, model, splitting, emission.

pub mod codegen;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod pose;
pub mod splitter;
pub mod types;
