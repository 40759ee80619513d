//! Command line interface for the bridge server

use bridge_core::{BridgeConfig, SerialSettings, DEFAULT_LISTEN_PORT, DEFAULT_THRESHOLD};
use clap::Parser;

/// Serial EMG to WebSocket broadcast bridge
#[derive(Debug, Parser)]
#[command(name = "bridge-server", version, about)]
pub struct Args {
    /// Raw readings at or above this value broadcast as 1
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f32,

    /// TCP port for the WebSocket endpoint
    #[arg(long, default_value_t = DEFAULT_LISTEN_PORT)]
    pub port: u16,

    /// Serial device path, bypassing automatic discovery
    #[arg(long)]
    pub serial_port: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value_t = bridge_core::EMG_BAUD_RATE)]
    pub baud: u32,
}

impl Args {
    /// Convert parsed arguments into the static process configuration
    pub fn into_config(self) -> BridgeConfig {
        BridgeConfig {
            threshold: self.threshold,
            listen_port: self.port,
            serial: SerialSettings {
                port_override: self.serial_port,
                baud_rate: self.baud,
                ..SerialSettings::default()
            },
        }
    }
}
