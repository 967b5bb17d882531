// ChatEvidence - core/mod.rs
//
// Core business logic layer: parsing, chunking, tagging and export.
// Dependencies: std plus data crates (regex, chrono, serde, sha2, encoding_rs).
// Must NOT depend on: platform, app, or touch the filesystem.

pub mod chunk;
pub mod dictionary;
pub mod encoding;
pub mod export;
pub mod model;
pub mod negation;
pub mod parser;
pub mod tagger;
