//! postforge: motion-program code generation for robots and 5-axis CNC.
//!
//! Abstract targets in, controller text out. Oversized ABB programs are split
//! into sub-procedures or streamed side modules. BLAKE3 manifests and a JSONL
//! event log record every export.

pub mod cli;
pub mod core;
pub mod emitters;
pub mod provenance;
