//! Local demonstration of the broadcast core without hardware
//!
//! Feeds the acquisition loop from a synthetic EMG source and prints the
//! classified stream the way a WebSocket subscriber would receive it.

use async_trait::async_trait;
use bridge_core::{BridgeResult, EmgSource};
use bridge_stream::{spawn_acquisition, BroadcastHub, ReconnectBackoff};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Slow sine sweep around the default threshold
struct SyntheticEmg {
    t: f32,
}

#[async_trait]
impl EmgSource for SyntheticEmg {
    async fn connect(&mut self) -> BridgeResult<()> {
        Ok(())
    }

    async fn read_sample(&mut self) -> BridgeResult<f32> {
        sleep(Duration::from_millis(20)).await;
        self.t += 0.02;
        Ok(100.0 + 80.0 * (self.t * 4.0).sin())
    }

    fn close(&mut self) {}
}

#[tokio::main]
async fn main() {
    let hub = Arc::new(BroadcastHub::new());
    let (_id, mut values) = hub.subscribe().await;

    let _control = spawn_acquisition(
        SyntheticEmg { t: 0.0 },
        100.0,
        hub,
        ReconnectBackoff::from_millis(250, 8_000),
    );

    println!("=== Synthetic EMG stream (threshold 100) ===");
    for _ in 0..100 {
        match values.recv().await {
            Some(state) => print!("{}", state),
            None => break,
        }
    }
    println!("\n=== Done ===");
}
