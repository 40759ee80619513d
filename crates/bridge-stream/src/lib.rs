//! Bridge-Stream: broadcast fan-out and the acquisition control loop
//!
//! The single-producer/multi-consumer core of the bridge: one acquisition
//! path feeds the hub, the hub fans out to every live subscriber
//! best-effort.

pub mod acquisition;
pub mod backoff;
pub mod hub;

pub use acquisition::*;
pub use backoff::*;
pub use hub::*;
