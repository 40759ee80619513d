//! Serial link state machine for the EMG device
//!
//! Owns the one physical serial connection: open at the configured baud
//! rate, read newline-terminated numeric frames, detect disconnection.
//! The serial device is an exclusively-owned resource; nothing else in
//! the process touches it.

use crate::resolver;
use async_trait::async_trait;
use bridge_core::{BridgeError, BridgeResult, EmgSource, SerialSettings};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

/// Connection lifecycle of the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No open connection
    Disconnected,
    /// Resolution and open in progress
    Connecting,
    /// Connection open, frames flowing
    Streaming,
}

/// The single owner of the physical serial connection.
///
/// Cycles `Disconnected → Connecting → Streaming → Disconnected`; a lost
/// link leaves the instance reusable for a fresh connect attempt.
pub struct SerialLink {
    settings: SerialSettings,
    state: LinkState,
    reader: Option<BufReader<SerialStream>>,
}

impl SerialLink {
    /// Create a link in the `Disconnected` state
    pub fn new(settings: SerialSettings) -> Self {
        SerialLink {
            settings,
            state: LinkState::Disconnected,
            reader: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Parse one frame from the device: ASCII numeric, newline-terminated
    pub fn parse_frame(line: &str) -> BridgeResult<f32> {
        let trimmed = line.trim();
        trimmed
            .parse::<f32>()
            .map_err(|_| BridgeError::MalformedFrame {
                frame: trimmed.to_string(),
            })
    }

    fn mark_lost(&mut self, reason: &str) -> BridgeError {
        self.reader = None;
        self.state = LinkState::Disconnected;
        BridgeError::LinkLost {
            reason: reason.to_string(),
        }
    }
}

/// Read frames until one parses, discarding malformed ones.
///
/// Returns `None` on end of stream.
async fn next_sample<R>(reader: &mut R) -> std::io::Result<Option<f32>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        match SerialLink::parse_frame(&line) {
            Ok(raw) => return Ok(Some(raw)),
            Err(err) => debug!(%err, "discarding frame"),
        }
    }
}

#[async_trait]
impl EmgSource for SerialLink {
    async fn connect(&mut self) -> BridgeResult<()> {
        self.state = LinkState::Connecting;

        let port = match resolver::resolve(&self.settings) {
            Ok(port) => port,
            Err(err) => {
                self.state = LinkState::Disconnected;
                return Err(err);
            }
        };

        match tokio_serial::new(&port, self.settings.baud_rate).open_native_async() {
            Ok(stream) => {
                info!(%port, baud = self.settings.baud_rate, "serial link connected");
                self.reader = Some(BufReader::new(stream));
                self.state = LinkState::Streaming;
                Ok(())
            }
            Err(err) => {
                self.state = LinkState::Disconnected;
                Err(BridgeError::ConnectionError {
                    port,
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn read_sample(&mut self) -> BridgeResult<f32> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => {
                return Err(BridgeError::LinkLost {
                    reason: "not connected".to_string(),
                })
            }
        };

        match next_sample(reader).await {
            Ok(Some(raw)) => Ok(raw),
            Ok(None) => Err(self.mark_lost("device closed the stream")),
            Err(err) => Err(self.mark_lost(&err.to_string())),
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            info!("serial link closed");
        }
        self.state = LinkState::Disconnected;
    }
}
