// ChatEvidence - app/mod.rs
//
// Application layer: dictionary selection and the per-file pipeline.
// Dependencies: core and platform layers.

pub mod dictionary_mgr;
pub mod pipeline;
