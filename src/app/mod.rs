// LogPanel - app/mod.rs
//
// Application layer: source enumeration, fetch cache, and the source
// state machine, plus the transport seam they fetch through.
// Dependencies: core layer, util.
// Must NOT depend on: platform specifics.

pub mod cache;
pub mod controller;
pub mod registry;
pub mod transport;
