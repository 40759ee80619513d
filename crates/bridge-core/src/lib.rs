//! Bridge-Core: Foundation types for the EMG stream bridge
//!
//! Sample model, threshold classification, configuration and errors shared
//! by the acquisition and streaming crates.

pub mod config;
pub mod error;
pub mod sample;
pub mod source;

pub use config::*;
pub use error::{BridgeError, BridgeResult};
pub use sample::*;
pub use source::EmgSource;
