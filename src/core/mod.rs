// Shared configuration and constants for the MUX tools
pub mod config;
pub mod constants;

pub use config::{ConfigError, MuxConfig, SpiConfig};
pub use constants::*;
