//! Static configuration for the bridge process
//!
//! All values are fixed at startup; nothing here is runtime-mutable.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

/// Baud rate of the EMG device
pub const EMG_BAUD_RATE: u32 = 115_200;

/// Default activation threshold matching the device integration
pub const DEFAULT_THRESHOLD: f32 = 100.0;

/// Default TCP port for the WebSocket endpoint
pub const DEFAULT_LISTEN_PORT: u16 = 8000;

/// Serial connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Explicit device path, bypassing automatic port discovery
    pub port_override: Option<String>,
    /// Baud rate for the serial connection
    pub baud_rate: u32,
    /// First reconnection delay in milliseconds
    pub backoff_floor_ms: u64,
    /// Maximum reconnection delay in milliseconds
    pub backoff_cap_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            port_override: None,
            baud_rate: EMG_BAUD_RATE,
            backoff_floor_ms: 250,
            backoff_cap_ms: 8_000,
        }
    }
}

/// Process configuration, immutable for the process lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Raw readings at or above this value classify as active
    pub threshold: f32,
    /// TCP port for the WebSocket endpoint
    pub listen_port: u16,
    /// Serial connection settings
    pub serial: SerialSettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            threshold: DEFAULT_THRESHOLD,
            listen_port: DEFAULT_LISTEN_PORT,
            serial: SerialSettings::default(),
        }
    }
}

impl BridgeConfig {
    /// Validate the configuration at startup.
    ///
    /// A failure here is the one error class that terminates the process.
    pub fn validate(&self) -> BridgeResult<()> {
        if !self.threshold.is_finite() {
            return Err(BridgeError::InvalidConfig {
                reason: format!("threshold must be a finite number, got {}", self.threshold),
            });
        }

        if self.listen_port == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "listen port must be nonzero".to_string(),
            });
        }

        if self.serial.baud_rate == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "baud rate must be nonzero".to_string(),
            });
        }

        if self.serial.backoff_floor_ms == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "backoff floor must be nonzero".to_string(),
            });
        }

        if self.serial.backoff_floor_ms > self.serial.backoff_cap_ms {
            return Err(BridgeError::InvalidConfig {
                reason: format!(
                    "backoff floor {}ms exceeds cap {}ms",
                    self.serial.backoff_floor_ms, self.serial.backoff_cap_ms
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.listen_port, 8000);
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = BridgeConfig {
            threshold: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BridgeConfig {
            threshold: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_listen_port_rejected() {
        let config = BridgeConfig {
            listen_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_floor_above_cap_rejected() {
        let mut config = BridgeConfig::default();
        config.serial.backoff_floor_ms = 10_000;
        config.serial.backoff_cap_ms = 1_000;
        assert!(config.validate().is_err());
    }
}
