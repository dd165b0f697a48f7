// LogPanel - util/mod.rs
//
// Utility modules: error types, named constants, logging setup.
// Error payloads name core model types; no dependencies on app or platform.

pub mod constants;
pub mod error;
pub mod logging;
