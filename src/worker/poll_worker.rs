use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use crate::api::VideoTaskApi;
use crate::job::VideoTaskTracker;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Timer-driven loop that polls the tracker until nothing is pending
///
/// All jobs are polled sequentially within one tick, from one task; the
/// tracker is borrowed mutably for the lifetime of the loop so nothing
/// else can race it.
pub struct PollWorker {
    interval: Duration,
}

impl PollWorker {
    /// Create a worker; the interval is clamped to 1-30 seconds
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL),
        }
    }

    /// Poll until every job is terminal or shutdown is signalled
    ///
    /// The timer is not re-armed once the tracker reports no pending
    /// work. Shutdown is only observed between polls, so a tick that has
    /// started runs to completion.
    pub async fn run<A: VideoTaskApi + Sync>(
        &self,
        api: &A,
        tracker: &mut VideoTaskTracker,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!(interval_secs = self.interval.as_secs(), "poll worker started");

        while tracker.has_pending_work() {
            tokio::select! {
                _ = sleep(self.interval) => {
                    tracker.poll_all(api).await;
                }
                _ = shutdown_rx.changed() => {
                    info!("poll worker received shutdown signal");
                    return;
                }
            }
        }

        info!("poll worker finished: all jobs terminal");
    }
}
