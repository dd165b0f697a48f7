// LogPanel - core/mod.rs
//
// Core logic layer: data model and pure text transforms.
// Must NOT depend on: app, platform, or any I/O crate directly.

pub mod filter;
pub mod model;
pub mod sanitize;
