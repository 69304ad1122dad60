// src/lib.rs
pub mod clock;
pub mod config;
pub mod motion;
pub mod print_stats;
pub mod web;

pub use clock::{HostClock, TimeSource};
pub use config::Config;
pub use motion::{ExtruderSnapshot, MotionStatusSource, SharedGcodeMove};
pub use print_stats::{JobOutcome, PrintState, PrintStats, StatsError, StatusSnapshot};
