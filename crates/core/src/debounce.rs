//! Delaying a rapidly changing value until it has been stable for a quiet period.
//!
//! [`Debouncer`] is a plain state machine driven by explicit instants, so the
//! controller can own one without holding a runtime handle. [`debounced`] wraps
//! the same behavior around a `tokio::sync::watch` channel.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Clock-driven debounce state.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    current: T,
    pending: Option<Pending<T>>,
    delay: Duration,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due: Instant,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// The initial value is committed immediately.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            current: initial,
            pending: None,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Last committed value.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Value waiting for the quiet period to elapse, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Replace any pending value and restart the quiet period at `now`.
    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
    }

    /// Drop the pending value without committing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Commit the pending value if its deadline has passed.
    ///
    /// Returns the newly committed value, or `None` if nothing is due or the
    /// due value equals the current one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.due <= now => {}
            _ => return None,
        }

        let pending = self.pending.take()?;
        if pending.value == self.current {
            return None;
        }
        self.current = pending.value.clone();
        Some(pending.value)
    }
}

/// Debounce a watch channel.
///
/// The returned receiver starts with the input's current value and then
/// receives each value that stayed unchanged for `delay`. When the input
/// sender is dropped, a still-pending value is published and the task exits.
pub fn debounced<T>(mut input: watch::Receiver<T>, delay: Duration) -> watch::Receiver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let initial = input.borrow_and_update().clone();
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        let mut open = true;
        while open {
            if input.changed().await.is_err() {
                break;
            }

            loop {
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            open = false;
                            break;
                        }
                    }
                    _ = tokio::time::sleep(delay) => break,
                }
            }

            let latest = input.borrow_and_update().clone();
            tx.send_if_modified(|current| {
                if *current == latest {
                    false
                } else {
                    *current = latest;
                    true
                }
            });

            if tx.is_closed() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_initial_value_is_immediate() {
        let debouncer = Debouncer::new("bat".to_string(), DELAY);
        assert_eq!(debouncer.current(), "bat");
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn test_rapid_updates_commit_once_with_final_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(String::new(), DELAY);

        for (i, text) in ["b", "ba", "bat"].iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            debouncer.update(text.to_string(), now);
            assert_eq!(debouncer.poll(now), None);
        }

        let last = start + Duration::from_millis(200);
        assert_eq!(debouncer.deadline(), Some(last + DELAY));
        assert_eq!(debouncer.poll(last + DELAY - Duration::from_millis(1)), None);
        assert_eq!(debouncer.poll(last + DELAY), Some("bat".to_string()));
        assert_eq!(debouncer.current(), "bat");

        // Emitted once
        assert_eq!(debouncer.poll(last + DELAY * 2), None);
        assert!(debouncer.pending().is_none());
    }

    #[test]
    fn test_settling_back_to_current_value_is_not_a_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new("bat".to_string(), DELAY);

        debouncer.update("batm".to_string(), start);
        debouncer.update("bat".to_string(), start + Duration::from_millis(50));

        assert_eq!(debouncer.poll(start + DELAY * 2), None);
        assert!(debouncer.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_channel_publishes_after_quiet_period() {
        let (tx, rx) = watch::channel(String::new());
        let mut out = debounced(rx, DELAY);
        assert_eq!(*out.borrow(), "");

        tx.send("b".to_string()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("ba".to_string()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("bat".to_string()).unwrap();
        let last_change = Instant::now();

        out.changed().await.unwrap();
        assert_eq!(*out.borrow_and_update(), "bat");
        assert!(Instant::now() - last_change >= DELAY);

        // Nothing else is pending
        let more = tokio::time::timeout(DELAY * 3, out.changed()).await;
        assert!(more.is_err());
    }

    #[test]
    fn test_debounced_starts_with_current_value() {
        tokio_test::block_on(async {
            let (_tx, rx) = watch::channel("initial".to_string());
            let out = debounced(rx, DELAY);
            assert_eq!(*out.borrow(), "initial");
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_flushes_when_input_closes() {
        let (tx, rx) = watch::channel(0u32);
        let mut out = debounced(rx, DELAY);

        tokio_test::assert_ok!(tx.send(7));
        drop(tx);

        out.changed().await.unwrap();
        assert_eq!(*out.borrow(), 7);
    }
}
