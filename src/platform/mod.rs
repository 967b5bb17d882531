// ChatEvidence - platform/mod.rs
//
// Platform abstraction layer: filesystem reads and configuration.
// Dependencies: standard library, directories, toml.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
