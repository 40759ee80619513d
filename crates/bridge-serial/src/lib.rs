//! Bridge-Serial: EMG device acquisition over USB serial
//!
//! Port discovery, the serial link state machine and frame parsing.

pub mod link;
pub mod resolver;

pub use link::*;
pub use resolver::*;
