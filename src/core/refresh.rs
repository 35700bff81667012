//! Repeating refresh timer tied to a scope

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::debug;

/// Emits `on_tick(generation)` once per period until dropped.
///
/// The first tick fires one full period after start; callers fetch
/// immediately on their own when a cycle begins.
pub struct RefreshTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn start<E, F>(generation: u64, period: Duration, tx: UnboundedSender<E>, on_tick: F) -> Self
    where
        E: Send + 'static,
        F: Fn(u64) -> E + Send + 'static,
    {
        debug!(generation, ?period, "Starting refresh timer");
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(on_tick(generation)).is_err() {
                    break;
                }
            }
        });
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        debug!(generation = self.generation, "Stopping refresh timer");
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let _timer = RefreshTimer::start(7, Duration::from_secs(2), tx, |g| g);

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let timer = RefreshTimer::start(1, Duration::from_secs(2), tx, |g| g);
        drop(timer);

        time::advance(Duration::from_secs(10)).await;
        // the aborted task drops its sender, closing the channel
        assert_eq!(rx.recv().await, None);
    }
}
