//! Sample model and threshold classification

use serde::{Deserialize, Serialize};

/// Binary muscle activity derived from one raw EMG reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MuscleState {
    /// Raw reading below the configured threshold
    Rest,
    /// Raw reading at or above the configured threshold
    Active,
}

impl MuscleState {
    /// Single-character token delivered to subscribers
    pub fn wire_token(&self) -> &'static str {
        match self {
            MuscleState::Rest => "0",
            MuscleState::Active => "1",
        }
    }

    /// Numeric form of the classification
    pub fn as_bit(&self) -> u8 {
        match self {
            MuscleState::Rest => 0,
            MuscleState::Active => 1,
        }
    }
}

impl std::fmt::Display for MuscleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_token())
    }
}

/// Classify one raw reading against the threshold.
///
/// The boundary is inclusive: `raw == threshold` classifies as `Active`.
pub fn classify(raw: f32, threshold: f32) -> MuscleState {
    if raw >= threshold {
        MuscleState::Active
    } else {
        MuscleState::Rest
    }
}

/// One raw EMG reading and its derived classification.
///
/// Ephemeral: exists for a single pipeline traversal, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Raw numeric reading from the device
    pub raw: f32,
    /// Binary classification of the reading
    pub state: MuscleState,
    /// Capture timestamp in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Sample {
    /// Build a sample from a raw reading and the configured threshold
    pub fn classify(raw: f32, threshold: f32) -> Self {
        Sample {
            raw,
            state: classify(raw, threshold),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_millis() as u64,
        }
    }
}
