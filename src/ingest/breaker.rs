pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

/// Consecutive-failure circuit breaker. Opens once the failure count exceeds the
/// threshold; any success closes it again.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    threshold: u32,
    consecutive_failures: u32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive_failures: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Returns the updated consecutive failure count.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub fn is_open(&self) -> bool {
        self.consecutive_failures > self.threshold
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

/// Counts consecutive entities that came back with no articles. These never
/// trip the breaker, but a long run of them is worth a warning.
#[derive(Debug, Clone)]
pub struct EmptyRunMonitor {
    threshold: u32,
    consecutive_empty: u32,
}

impl EmptyRunMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive_empty: 0,
        }
    }

    /// Records one entity outcome. Returns true only on the entity that first
    /// takes the run past the threshold.
    pub fn record(&mut self, empty: bool) -> bool {
        if !empty {
            self.consecutive_empty = 0;
            return false;
        }
        self.consecutive_empty = self.consecutive_empty.saturating_add(1);
        self.consecutive_empty == self.threshold.saturating_add(1)
    }

    pub fn consecutive_empty(&self) -> u32 {
        self.consecutive_empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_only_above_threshold() {
        let mut breaker = CircuitBreaker::new(3);
        for expected in 1..=3 {
            assert_eq!(breaker.record_failure(), expected);
            assert!(!breaker.is_open());
        }
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_success_resets_count() {
        let mut breaker = CircuitBreaker::default();
        for _ in 0..10 {
            breaker.record_failure();
        }
        breaker.record_success();
        assert_eq!(breaker.consecutive_failures(), 0);
        breaker.record_failure();
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_zero_threshold_opens_on_first_failure() {
        let mut breaker = CircuitBreaker::new(0);
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_empty_run_flags_once_past_threshold() {
        let mut monitor = EmptyRunMonitor::new(2);
        let flags: Vec<bool> = (0..5).map(|_| monitor.record(true)).collect();
        assert_eq!(flags, vec![false, false, true, false, false]);
        assert_eq!(monitor.consecutive_empty(), 5);
    }

    #[test]
    fn test_content_resets_empty_run() {
        let mut monitor = EmptyRunMonitor::new(1);
        assert!(!monitor.record(true));
        assert!(!monitor.record(false));
        assert_eq!(monitor.consecutive_empty(), 0);
        assert!(!monitor.record(true));
        assert!(monitor.record(true));
    }
}
