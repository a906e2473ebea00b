use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Orders concurrent refreshes. Each refresh takes a token from [`issue`];
/// only the result carrying the most recently issued token is kept, so a slow
/// older refresh can never overwrite a newer one.
///
/// [`issue`]: RefreshSequencer::issue
#[derive(Debug)]
pub struct RefreshSequencer<T> {
    issued: AtomicU64,
    latest: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> Default for RefreshSequencer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RefreshSequencer<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `value` if `token` is still the latest issued. Returns whether it
    /// was applied.
    pub fn publish(&self, token: u64, value: T) -> bool {
        if token != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(token, "discarding stale refresh");
            return false;
        }
        let Ok(mut latest) = self.latest.lock() else {
            return false;
        };
        if latest.as_ref().is_some_and(|(held, _)| *held >= token) {
            return false;
        }
        *latest = Some((token, value));
        true
    }

    pub fn latest(&self) -> Option<T> {
        self.latest
            .lock()
            .ok()
            .and_then(|latest| latest.as_ref().map(|(_, v)| v.clone()))
    }
}

/// Periodic refresh driver. Each [`tick`] starts the work on a background
/// thread unless the previous run is still going, in which case the tick is
/// skipped. Tokens come from a [`RefreshSequencer`], so a run is never
/// superseded while it is in flight and every completed run gets published.
///
/// [`tick`]: RefreshLoop::tick
#[derive(Debug)]
pub struct RefreshLoop<T> {
    sequencer: Arc<RefreshSequencer<(u64, T)>>,
    worker: Option<JoinHandle<()>>,
    shown: u64,
}

impl<T: Clone + Send + 'static> Default for RefreshLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> RefreshLoop<T> {
    pub fn new() -> Self {
        Self {
            sequencer: Arc::new(RefreshSequencer::new()),
            worker: None,
            shown: 0,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start `work` in the background. Returns the token it runs under, or
    /// `None` when a previous run is still busy and this tick was skipped.
    pub fn tick<F>(&mut self, work: F) -> Option<u64>
    where
        F: FnOnce() -> crate::Result<T> + Send + 'static,
    {
        if self.in_flight() {
            tracing::debug!("previous refresh still running, skipping tick");
            return None;
        }

        let token = self.sequencer.issue();
        let sequencer = Arc::clone(&self.sequencer);
        self.worker = Some(thread::spawn(move || match work() {
            Ok(value) => {
                sequencer.publish(token, (token, value));
            }
            Err(e) => tracing::warn!(error = %e, token, "refresh failed"),
        }));
        Some(token)
    }

    /// The newest published result, if it has not been returned before.
    pub fn take_new(&mut self) -> Option<T> {
        let (token, value) = self.sequencer.latest()?;
        if token == self.shown {
            return None;
        }
        self.shown = token;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::time::Duration;

    #[test]
    fn stale_token_is_rejected() {
        let seq = RefreshSequencer::new();
        let first = seq.issue();
        let second = seq.issue();

        assert!(seq.publish(second, "new"));
        assert!(!seq.publish(first, "old"));
        assert_eq!(seq.latest(), Some("new"));
    }

    #[test]
    fn older_result_arriving_first_is_still_dropped() {
        let seq = RefreshSequencer::new();
        let first = seq.issue();
        let second = seq.issue();

        assert!(!seq.publish(first, 1));
        assert_eq!(seq.latest(), None);
        assert!(seq.publish(second, 2));
        assert_eq!(seq.latest(), Some(2));
    }

    #[test]
    fn only_last_of_many_threads_wins() {
        let seq = Arc::new(RefreshSequencer::new());
        let tokens: Vec<u64> = (0..8).map(|_| seq.issue()).collect();
        let last = *tokens.last().unwrap();

        let handles: Vec<_> = tokens
            .into_iter()
            .map(|token| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || seq.publish(token, token))
            })
            .collect();
        let applied: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(applied.iter().filter(|a| **a).count(), 1);
        assert_eq!(seq.latest(), Some(last));
    }

    #[test]
    fn slow_work_is_not_restarted_every_tick() {
        let mut refresh = RefreshLoop::new();
        let mut started = 0;
        let mut results = Vec::new();

        for _ in 0..20 {
            let run = refresh.tick(|| {
                thread::sleep(Duration::from_millis(60));
                Ok("summary")
            });
            if run.is_some() {
                started += 1;
            }
            thread::sleep(Duration::from_millis(10));
            results.extend(refresh.take_new());
        }
        while refresh.in_flight() {
            thread::sleep(Duration::from_millis(5));
        }
        results.extend(refresh.take_new());

        assert!(started < 20, "ticks during a running refresh are skipped");
        assert!(!results.is_empty());
        assert!(results.len() <= started);
        assert!(refresh.take_new().is_none());
    }

    #[test]
    fn failed_run_frees_the_next_tick() {
        let mut refresh: RefreshLoop<u32> = RefreshLoop::new();
        assert!(refresh.tick(|| Err(AppError::InvalidMonth(0))).is_some());
        while refresh.in_flight() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(refresh.take_new().is_none());

        let token = refresh.tick(|| Ok(7)).unwrap();
        assert_eq!(token, 2);
        while refresh.in_flight() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(refresh.take_new(), Some(7));
    }
}
