use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Fixed-ceiling countdown running on its own task
///
/// `on_tick` sees every remaining value from `ceiling - 1` down to `0`, one
/// per `tick`. `on_elapsed` runs once, right after the tick that reached
/// zero, unless the countdown was cancelled first. Dropping the handle
/// cancels it.
pub(crate) struct Countdown {
    cancel: Option<oneshot::Sender<()>>,
}

impl Countdown {
    pub(crate) fn start<T, E, Fut>(ceiling: u32, tick: Duration, mut on_tick: T, on_elapsed: E) -> Self
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let mut remaining = ceiling;
            let tick = tick.max(Duration::from_millis(1));
            let mut ticker = interval_at(Instant::now() + tick, tick);

            while remaining > 0 {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        debug!("Countdown cancelled at {}", remaining);
                        return;
                    }
                    _ = ticker.tick() => {
                        remaining -= 1;
                        on_tick(remaining);
                    }
                }
            }

            debug!("Countdown elapsed");
            on_elapsed().await;
        });

        Self {
            cancel: Some(cancel_tx),
        }
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_countdown_visits_every_value_and_elapses_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let elapsed = Arc::new(AtomicUsize::new(0));

        let seen_tick = Arc::clone(&seen);
        let elapsed_hit = Arc::clone(&elapsed);
        let _countdown = Countdown::start(
            5,
            Duration::from_secs(1),
            move |remaining| seen_tick.lock().unwrap().push(remaining),
            move || async move {
                elapsed_hit.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(*seen.lock().unwrap(), vec![4, 3, 2, 1, 0]);
        assert_eq!(elapsed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_countdown_never_elapses() {
        let elapsed = Arc::new(AtomicUsize::new(0));
        let elapsed_hit = Arc::clone(&elapsed);

        let mut countdown = Countdown::start(
            3,
            Duration::from_secs(1),
            |_| {},
            move || async move {
                elapsed_hit.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        countdown.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(elapsed.load(Ordering::SeqCst), 0);
    }
}
