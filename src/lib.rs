// ChatEvidence - lib.rs
//
// Library entry point, exposing every layer for integration testing and
// for embedding the parser and tagger in other tools.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
