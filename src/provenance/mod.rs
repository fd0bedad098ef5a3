//! Provenance: content hashing and the generation event log.

pub mod eventlog;
pub mod hasher;
