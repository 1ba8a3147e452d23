// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod config;
pub mod error;
pub mod operator;
pub mod problem;
pub mod problem_set;
pub mod runtime;
pub mod session;
pub mod ui;

pub use error::DrillError;

/// One timer tick; the per-problem timer counts tenths of a second.
pub const TICK_RATE_MS: u64 = 100;
