//! Background poll timer driving unconditional board reconciliation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the poll timer. Each cycle sends one tick; the receiving side
/// funnels ticks through the reconciliation gate, so a slow reload never
/// stacks up overlapping refreshes.
pub fn spawn_board_poller(
    stop: Arc<AtomicBool>,
    poll_interval_ms: u64,
    ticks: UnboundedSender<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(poll_interval_ms, "board poller started");
        while !stop.load(Ordering::Relaxed) {
            interruptible_sleep(Duration::from_millis(poll_interval_ms), &stop).await;
            if stop.load(Ordering::Relaxed) {
                break;
            }

            if ticks.send(()).is_err() {
                debug!("poll tick receiver dropped; stopping board poller");
                return;
            }
            debug!(poll_interval_ms, "board poll tick");
        }
        debug!("board poller stopped");
    })
}

/// Sleep that can be interrupted by stop signal
async fn interruptible_sleep(duration: Duration, stop: &AtomicBool) {
    let chunk = Duration::from_millis(100);
    let mut remaining = duration;
    while remaining > Duration::ZERO && !stop.load(Ordering::Relaxed) {
        let sleep_duration = remaining.min(chunk);
        tokio::time::sleep(sleep_duration).await;
        remaining = remaining.saturating_sub(sleep_duration);
    }
}
