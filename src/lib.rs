// LogPanel - lib.rs
//
// Library entry point. The binary in `main.rs` is one consumer; a dashboard
// view layer embedding the controller is another.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
