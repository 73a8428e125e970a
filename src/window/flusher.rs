//! Background task that closes windows on the period boundary.
//!
//! Follows the actor shape used elsewhere in this codebase: the task owns
//! its loop, a handle owns a shutdown channel, and shutdown is acknowledged
//! only after the final flush has run so no counted entry is lost.

use super::aggregator::WindowAggregator;
use super::clock::WindowClock;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

struct WindowFlusher<C: WindowClock> {
    aggregator: Arc<WindowAggregator<C>>,
    shutdown_rx: oneshot::Receiver<oneshot::Sender<()>>,
}

impl<C: WindowClock> WindowFlusher<C> {
    async fn run(mut self) {
        let period = self.aggregator.window_duration();
        // First tick lands one full period out, not immediately.
        let mut boundary = interval_at(Instant::now() + period, period);
        // A stalled runtime must not replay missed boundaries as a burst.
        boundary.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Shutdown takes priority over an already-elapsed boundary;
                // the final flush below covers it, so that tick is dropped
                // rather than processed as a second flush.
                biased;

                reply = &mut self.shutdown_rx => {
                    self.aggregator.flush();
                    info!("Window flusher stopped");
                    if let Ok(ack) = reply {
                        let _ = ack.send(());
                    }
                    return;
                }
                _ = boundary.tick() => {
                    debug!("Window boundary reached");
                    self.aggregator.flush();
                }
            }
        }
    }
}

/// Handle for stopping a spawned flusher.
///
/// Shutdown consumes the handle, so a second stop is unrepresentable.
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// stops the task with a final flush, but without waiting for it.
pub struct FlusherHandle {
    shutdown_tx: oneshot::Sender<oneshot::Sender<()>>,
}

impl FlusherHandle {
    /// Stop the flusher. Returns once the final flush has completed.
    pub async fn shutdown(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.shutdown_tx.send(ack_tx).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

/// Spawn the periodic flusher for `aggregator` on the current runtime.
pub fn spawn_window_flusher<C: WindowClock>(
    aggregator: Arc<WindowAggregator<C>>,
) -> (FlusherHandle, JoinHandle<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let period = aggregator.window_duration();
    let flusher = WindowFlusher {
        aggregator,
        shutdown_rx,
    };
    let task = tokio::spawn(flusher.run());
    info!(period_ms = period.as_millis() as u64, "Window flusher started");
    (FlusherHandle { shutdown_tx }, task)
}
