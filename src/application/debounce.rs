//! Per-key debounce gate.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// Lets a key fire only when more than `window` has passed since it last fired.
///
/// Suppressed triggers do not move the window.
#[derive(Debug)]
pub struct Debouncer<K> {
    window: Duration,
    last_fired: HashMap<K, Instant>,
}

impl<K: Hash + Eq> Debouncer<K> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a trigger for `key` at `now`, returning whether it fires.
    pub fn should_fire(&mut self, key: K, now: Instant) -> bool {
        match self.last_fired.get(&key) {
            Some(last) if now.saturating_duration_since(*last) <= self.window => false,
            _ => {
                self.last_fired.insert(key, now);
                true
            }
        }
    }

    /// Number of keys that have fired at least once.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_fired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn first_trigger_fires() {
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(debouncer.should_fire("m", Instant::now()));
    }

    #[test]
    fn triggers_inside_window_are_suppressed() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();
        assert!(debouncer.should_fire("m", t0));
        assert!(!debouncer.should_fire("m", t0 + Duration::from_millis(100)));
    }

    #[test]
    fn triggers_past_window_fire_again() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();
        assert!(debouncer.should_fire("m", t0));
        assert!(debouncer.should_fire("m", t0 + Duration::from_millis(600)));
    }

    #[test]
    fn suppressed_trigger_does_not_extend_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();
        assert!(debouncer.should_fire("m", t0));
        assert!(!debouncer.should_fire("m", t0 + Duration::from_millis(400)));
        assert!(debouncer.should_fire("m", t0 + Duration::from_millis(550)));
    }

    #[test]
    fn keys_are_independent() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();
        assert!(debouncer.should_fire("a", t0));
        assert!(debouncer.should_fire("b", t0 + Duration::from_millis(10)));
        assert_eq!(debouncer.tracked(), 2);
    }
}
