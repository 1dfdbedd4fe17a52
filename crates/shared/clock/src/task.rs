use odyssey_core::Timestamp;
use odyssey_ports::Ticker;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cooperative cancellation flag shared between a loop and its owner
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolve once cancellation has been requested
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A spawned loop running a callback on every tick until cancelled
///
/// The callback can end the loop itself by returning `ControlFlow::Break`.
/// A callback that is already running is allowed to finish before the
/// loop observes cancellation.
pub struct ScheduledTask {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<u64>,
}

impl ScheduledTask {
    /// Spawn a loop on the current tokio runtime
    pub fn spawn<T, F, Fut>(name: impl Into<String>, ticker: T, on_tick: F) -> Self
    where
        T: Ticker + 'static,
        F: FnMut(Timestamp) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let name = name.into();
        let token = CancellationToken::new();
        let handle = tokio::spawn(Self::run(name.clone(), ticker, token.clone(), on_tick));

        Self {
            name,
            token,
            handle,
        }
    }

    async fn run<T, F, Fut>(
        name: String,
        mut ticker: T,
        token: CancellationToken,
        mut on_tick: F,
    ) -> u64
    where
        T: Ticker,
        F: FnMut(Timestamp) -> Fut,
        Fut: Future<Output = ControlFlow<()>>,
    {
        log::debug!("[{}] Scheduled task started", name);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    log::debug!("[{}] Cancelled after {} ticks", name, ticks);
                    break;
                }

                tick = ticker.tick() => {
                    let Some(now) = tick else {
                        log::debug!("[{}] Ticker exhausted after {} ticks", name, ticks);
                        break;
                    };
                    ticks += 1;
                    if on_tick(now).await.is_break() {
                        log::debug!("[{}] Finished after {} ticks", name, ticks);
                        break;
                    }
                }
            }
        }

        ticks
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token that cancels this task when triggered
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to end on its own; returns the number of ticks handled
    pub async fn join(self) -> u64 {
        match self.handle.await {
            Ok(ticks) => ticks,
            Err(e) => {
                log::error!("[{}] Scheduled task failed: {}", self.name, e);
                0
            }
        }
    }

    /// Cancel the loop and wait for it to stop; returns the number of ticks handled
    pub async fn shutdown(self) -> u64 {
        self.token.cancel();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use chrono::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_token_cancel_is_observed() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };

        token.cancel();
        token.cancel();
        waiter.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_task_runs_per_tick_until_shutdown() {
        let clock = ManualClock::starting_now();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let task = ScheduledTask::spawn("poller", clock.ticker(Duration::seconds(5)), move |now| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(now);
                ControlFlow::Continue(())
            }
        });

        let first = rx.recv().await.unwrap();
        clock.advance(Duration::seconds(5));
        let second = rx.recv().await.unwrap();
        assert_eq!(second - first, Duration::seconds(5));

        assert_eq!(task.shutdown().await, 2);
    }

    #[tokio::test]
    async fn test_task_stops_on_break() {
        let clock = ManualClock::starting_now();
        let task = ScheduledTask::spawn("one-shot", clock.ticker(Duration::seconds(1)), |_| async {
            ControlFlow::Break(())
        });

        assert_eq!(task.join().await, 1);
    }
}
