//! Error handling for the EMG stream bridge
//!
//! Every I/O-facing variant is contained and retried by the acquisition
//! loop; only a configuration error is allowed to terminate the process.

use std::fmt;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error type covering port resolution, the serial link and configuration
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BridgeError {
    /// No candidate serial port is present on the system
    NoDeviceFound,

    /// More than one plausible EMG device and no rule to pick one
    AmbiguousDevice {
        /// Port names of the competing candidates
        candidates: Vec<String>,
    },

    /// Opening the serial device failed
    ConnectionError {
        /// Port that was being opened
        port: String,
        /// Underlying failure description
        reason: String,
    },

    /// The serial connection dropped after a successful open
    LinkLost {
        /// Underlying I/O failure description
        reason: String,
    },

    /// A frame read from the device could not be parsed as a number
    MalformedFrame {
        /// The offending frame, trimmed
        frame: String,
    },

    /// Invalid static configuration
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::NoDeviceFound => {
                write!(f, "No serial device found")
            }
            BridgeError::AmbiguousDevice { candidates } => {
                write!(
                    f,
                    "Ambiguous serial device, candidates: {}",
                    candidates.join(", ")
                )
            }
            BridgeError::ConnectionError { port, reason } => {
                write!(f, "Cannot open serial port {}: {}", port, reason)
            }
            BridgeError::LinkLost { reason } => {
                write!(f, "Serial link lost: {}", reason)
            }
            BridgeError::MalformedFrame { frame } => {
                write!(f, "Malformed frame from device: {:?}", frame)
            }
            BridgeError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for BridgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BridgeError::AmbiguousDevice {
            candidates: vec!["/dev/ttyUSB0".to_string(), "/dev/ttyUSB1".to_string()],
        };
        let display = format!("{}", error);
        assert!(display.contains("Ambiguous"));
        assert!(display.contains("/dev/ttyUSB0"));
        assert!(display.contains("/dev/ttyUSB1"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = BridgeError::LinkLost {
            reason: "unplugged".to_string(),
        };
        let error2 = BridgeError::LinkLost {
            reason: "unplugged".to_string(),
        };
        assert_eq!(error1, error2);
    }
}
