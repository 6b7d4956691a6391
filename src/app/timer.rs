use std::time::{Duration, Instant};

/// Tracks how long the in-flight request has been running, and freezes
/// the measurement once a terminal result for it arrives.
#[derive(Debug)]
pub struct RequestTimer {
    active: bool,
    started_at: Instant,
    last_duration: Duration,
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self {
            active: false,
            started_at: Instant::now(),
            last_duration: Duration::ZERO,
        }
    }
}

impl RequestTimer {
    pub fn start(&mut self) {
        self.active = true;
        self.started_at = Instant::now();
    }

    /// Freeze the measurement. Only the event-merge step calls this,
    /// exactly when a non-stale result arrives.
    pub fn stop(&mut self) {
        self.active = false;
        self.last_duration = self.started_at.elapsed();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        if self.active {
            self.started_at.elapsed()
        } else {
            self.last_duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_before_first_start() {
        let timer = RequestTimer::default();
        assert!(!timer.is_active());
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn elapsed_grows_while_active() {
        let mut timer = RequestTimer::default();
        timer.start();
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        let second = timer.elapsed();
        assert!(timer.is_active());
        assert!(second >= first);
    }

    #[test]
    fn stop_freezes_the_measurement() {
        let mut timer = RequestTimer::default();
        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        timer.stop();
        let frozen = timer.elapsed();
        assert!(frozen >= Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.elapsed(), frozen);
    }

    #[test]
    fn restart_resets_the_clock() {
        let mut timer = RequestTimer::default();
        timer.start();
        std::thread::sleep(Duration::from_millis(10));
        timer.stop();
        timer.start();
        assert!(timer.is_active());
        assert!(timer.elapsed() < Duration::from_millis(10));
    }
}
