//! Acquisition control loop: serial source → classifier → hub
//!
//! The only run-forever component in the process. Transient data errors
//! skip the iteration, a lost link triggers bounded-backoff reconnection,
//! and only an explicit shutdown command stops the loop.

use crate::backoff::ReconnectBackoff;
use crate::hub::BroadcastHub;
use bridge_core::{BridgeError, EmgSource, Sample};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Commands for controlling the acquisition loop
#[derive(Debug, Clone)]
pub enum AcquisitionCommand {
    /// Stop the loop and release the serial device
    Shutdown,
}

/// Drives the sample pipeline at the device's own cadence: one iteration
/// per successfully read sample, no independent polling timer.
pub struct AcquisitionLoop<S: EmgSource> {
    source: S,
    threshold: f32,
    hub: Arc<BroadcastHub>,
    backoff: ReconnectBackoff,
    command_receiver: mpsc::Receiver<AcquisitionCommand>,
    command_sender: mpsc::Sender<AcquisitionCommand>,
}

impl<S: EmgSource> AcquisitionLoop<S> {
    /// Create a new loop around an exclusively-owned sample source
    pub fn new(
        source: S,
        threshold: f32,
        hub: Arc<BroadcastHub>,
        backoff: ReconnectBackoff,
    ) -> Self {
        let (command_sender, command_receiver) = mpsc::channel(8);

        AcquisitionLoop {
            source,
            threshold,
            hub,
            backoff,
            command_receiver,
            command_sender,
        }
    }

    /// Handle for sending control commands
    pub fn command_handle(&self) -> mpsc::Sender<AcquisitionCommand> {
        self.command_sender.clone()
    }

    /// Run until shutdown.
    ///
    /// Never returns on a data error: port resolution and connect
    /// failures retry with backoff indefinitely, a lost link reconnects,
    /// anything else is logged and the iteration skipped.
    pub async fn run(self) {
        let AcquisitionLoop {
            mut source,
            threshold,
            hub,
            mut backoff,
            mut command_receiver,
            // Held so an idle control channel does not read as closed.
            command_sender: _command_sender,
        } = self;

        info!(threshold, "acquisition loop started");

        if !connect_with_backoff(&mut source, &mut backoff, &mut command_receiver).await {
            info!("acquisition loop stopped before first connect");
            return;
        }

        loop {
            tokio::select! {
                result = source.read_sample() => match result {
                    Ok(raw) => {
                        let sample = Sample::classify(raw, threshold);
                        debug!(raw = sample.raw, state = %sample.state, "sample");
                        hub.publish(sample.state).await;
                    }
                    Err(BridgeError::LinkLost { reason }) => {
                        warn!(%reason, "serial link lost, reconnecting");
                        source.close();
                        if !connect_with_backoff(&mut source, &mut backoff, &mut command_receiver).await {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%err, "skipping sample");
                    }
                },
                command = command_receiver.recv() => match command {
                    Some(AcquisitionCommand::Shutdown) | None => break,
                },
            }
        }

        source.close();
        info!("acquisition loop stopped");
    }
}

/// Retry resolution and connect with bounded exponential backoff until it
/// succeeds or a shutdown command arrives. Returns false on shutdown.
async fn connect_with_backoff<S: EmgSource>(
    source: &mut S,
    backoff: &mut ReconnectBackoff,
    commands: &mut mpsc::Receiver<AcquisitionCommand>,
) -> bool {
    loop {
        match source.connect().await {
            Ok(()) => {
                backoff.reset();
                return true;
            }
            Err(err) => {
                let delay = backoff.next_delay();
                warn!(%err, delay_ms = delay.as_millis() as u64, "connect failed, retrying");
                tokio::select! {
                    _ = sleep(delay) => {}
                    command = commands.recv() => match command {
                        Some(AcquisitionCommand::Shutdown) | None => return false,
                    },
                }
            }
        }
    }
}

/// Start an acquisition loop on a background task, returning the control
/// handle.
pub fn spawn_acquisition<S>(
    source: S,
    threshold: f32,
    hub: Arc<BroadcastHub>,
    backoff: ReconnectBackoff,
) -> mpsc::Sender<AcquisitionCommand>
where
    S: EmgSource + Send + 'static,
{
    let acquisition = AcquisitionLoop::new(source, threshold, hub, backoff);
    let handle = acquisition.command_handle();
    tokio::spawn(acquisition.run());
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_core::{BridgeResult, MuscleState};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source driven by a script of connect and read outcomes.
    /// Once the read script is exhausted it suspends forever, like a
    /// device that has gone quiet.
    struct ScriptedSource {
        connect_script: VecDeque<BridgeResult<()>>,
        read_script: VecDeque<BridgeResult<f32>>,
        connect_attempts: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(
            connect_script: Vec<BridgeResult<()>>,
            read_script: Vec<BridgeResult<f32>>,
        ) -> (Self, Arc<AtomicUsize>) {
            let connect_attempts = Arc::new(AtomicUsize::new(0));
            let source = ScriptedSource {
                connect_script: connect_script.into(),
                read_script: read_script.into(),
                connect_attempts: connect_attempts.clone(),
            };
            (source, connect_attempts)
        }
    }

    #[async_trait]
    impl EmgSource for ScriptedSource {
        async fn connect(&mut self) -> BridgeResult<()> {
            self.connect_attempts.fetch_add(1, Ordering::SeqCst);
            self.connect_script.pop_front().unwrap_or(Ok(()))
        }

        async fn read_sample(&mut self) -> BridgeResult<f32> {
            match self.read_script.pop_front() {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }

        fn close(&mut self) {}
    }

    #[tokio::test]
    async fn test_two_subscribers_see_classified_sequence() {
        let hub = Arc::new(BroadcastHub::new());
        let (_id_a, mut rx_a) = hub.subscribe().await;
        let (_id_b, mut rx_b) = hub.subscribe().await;

        let (source, _) = ScriptedSource::new(vec![], vec![Ok(0.2), Ok(0.9), Ok(0.5)]);
        let _handle = spawn_acquisition(
            source,
            0.5,
            hub.clone(),
            ReconnectBackoff::from_millis(10, 100),
        );

        for rx in [&mut rx_a, &mut rx_b] {
            assert_eq!(rx.recv().await.unwrap(), MuscleState::Rest);
            assert_eq!(rx.recv().await.unwrap(), MuscleState::Active);
            assert_eq!(rx.recv().await.unwrap(), MuscleState::Active);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_link_reconnects_and_resumes() {
        let hub = Arc::new(BroadcastHub::new());
        let (_id, mut rx) = hub.subscribe().await;

        let (source, connect_attempts) = ScriptedSource::new(
            vec![
                Ok(()),
                Err(BridgeError::NoDeviceFound),
                Err(BridgeError::ConnectionError {
                    port: "/dev/ttyUSB0".to_string(),
                    reason: "busy".to_string(),
                }),
                Ok(()),
            ],
            vec![
                Ok(1.0),
                Err(BridgeError::LinkLost {
                    reason: "unplugged".to_string(),
                }),
                Ok(2.0),
            ],
        );

        let _handle = spawn_acquisition(
            source,
            1.5,
            hub.clone(),
            ReconnectBackoff::from_millis(10, 40),
        );

        // Before the gap and after the reconnection, no process restart.
        assert_eq!(rx.recv().await.unwrap(), MuscleState::Rest);
        assert_eq!(rx.recv().await.unwrap(), MuscleState::Active);
        assert_eq!(connect_attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_shutdown_command_stops_the_loop() {
        let hub = Arc::new(BroadcastHub::new());
        let (source, _) = ScriptedSource::new(vec![], vec![]);
        let acquisition =
            AcquisitionLoop::new(source, 0.5, hub, ReconnectBackoff::from_millis(10, 100));
        let handle = acquisition.command_handle();
        let join = tokio::spawn(acquisition.run());

        handle.send(AcquisitionCommand::Shutdown).await.unwrap();
        join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_reconnect_backoff() {
        let hub = Arc::new(BroadcastHub::new());
        let (source, _) = ScriptedSource::new(vec![Err(BridgeError::NoDeviceFound)], vec![]);
        let acquisition = AcquisitionLoop::new(
            source,
            0.5,
            hub,
            // Long delay so termination proves the command interrupted
            // the backoff sleep rather than waiting it out.
            ReconnectBackoff::from_millis(60_000, 60_000),
        );
        let handle = acquisition.command_handle();
        let join = tokio::spawn(acquisition.run());

        handle.send(AcquisitionCommand::Shutdown).await.unwrap();
        join.await.unwrap();
    }
}
