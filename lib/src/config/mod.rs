//! Configuration consulted by the fill engine.

mod print_config;

pub use print_config::{PrintConfig, PrintObjectConfig};
