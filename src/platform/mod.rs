// LogPanel - platform/mod.rs
//
// Platform layer: config files, platform directories, network transport.
// Dependencies: util, core model types, the app::transport trait.
// Must NOT depend on: the controller or registry.

pub mod config;
pub mod http;
