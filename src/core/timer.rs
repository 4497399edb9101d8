//! Self-contained timers - callers pass the current time in milliseconds,
//! each timer keeps its own reference point and decides when to fire.

use std::time::Duration;

/// Frame pacer - computes how long to sleep to hold a target rate
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    frame_ms: f64,
}

impl FramePacer {
    /// Create pacer for the given frequency
    pub fn new(hz: f64) -> Self {
        Self {
            frame_ms: 1000.0 / hz,
        }
    }

    pub fn frame_ms(&self) -> f64 {
        self.frame_ms
    }

    /// Remaining sleep for a frame that started at `frame_start_ms`
    pub fn remaining(&self, frame_start_ms: f64, now_ms: f64) -> Option<Duration> {
        let elapsed = (now_ms - frame_start_ms).max(0.0);
        if elapsed >= self.frame_ms {
            return None;
        }
        Some(Duration::from_secs_f64((self.frame_ms - elapsed) / 1000.0))
    }
}

/// Key debouncer - accepts a key if it differs from the previous one or
/// the previous acceptance is old enough
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    repeat_ms: f64,
    last: Option<(u8, f64)>,
}

impl Debouncer {
    pub fn new(repeat_ms: f64) -> Self {
        Self {
            repeat_ms,
            last: None,
        }
    }

    /// Returns true if the key should be acted on
    pub fn accept(&mut self, key: u8, now_ms: f64) -> bool {
        let accepted = match self.last {
            Some((last_key, at)) => key != last_key || now_ms - at >= self.repeat_ms,
            None => true,
        };
        if accepted {
            self.last = Some((key, now_ms));
        }
        accepted
    }
}

/// Idle timer - expires once the time since the last activity exceeds
/// the timeout
#[derive(Debug, Clone, Copy)]
pub struct IdleTimer {
    timeout_ms: f64,
    last_activity_ms: f64,
}

impl IdleTimer {
    pub fn new(timeout_ms: f64, now_ms: f64) -> Self {
        Self {
            timeout_ms,
            last_activity_ms: now_ms,
        }
    }

    /// Record user or video activity
    pub fn touch(&mut self, now_ms: f64) {
        self.last_activity_ms = now_ms;
    }

    pub fn idle_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.last_activity_ms
    }

    /// True once idle time strictly exceeds the timeout
    pub fn expired(&self, now_ms: f64) -> bool {
        self.idle_ms(now_ms) > self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_sleeps_for_the_rest_of_the_frame() {
        let pacer = FramePacer::new(60.0);
        let rest = pacer.remaining(0.0, 6.0).unwrap();
        let expected = 1000.0 / 60.0 - 6.0;
        assert!((rest.as_secs_f64() * 1000.0 - expected).abs() < 0.01);
    }

    #[test]
    fn pacer_never_sleeps_for_late_frames() {
        let pacer = FramePacer::new(60.0);
        assert!(pacer.remaining(0.0, 20.0).is_none());
        // Clock going backwards is treated as zero elapsed
        assert!(pacer.remaining(10.0, 5.0).is_some());
    }

    #[test]
    fn debouncer_rejects_quick_repeats() {
        let mut keys = Debouncer::new(2000.0);

        assert!(keys.accept(b'1', 0.0));
        assert!(!keys.accept(b'1', 500.0));
        assert!(keys.accept(b'2', 600.0)); // Different key
        assert!(keys.accept(b'1', 700.0));
        assert!(!keys.accept(b'1', 2699.0));
        assert!(keys.accept(b'1', 2700.0)); // Exactly 2s later
        assert!(!keys.accept(b'1', 2701.0));
    }

    #[test]
    fn idle_timer_expires_strictly_after_timeout() {
        let mut idle = IdleTimer::new(1000.0, 0.0);

        assert!(!idle.expired(999.0));
        assert!(!idle.expired(1000.0));
        assert!(idle.expired(1000.5));

        idle.touch(900.0);
        assert!(!idle.expired(1500.0));
        assert_eq!(idle.idle_ms(1500.0), 600.0);
    }
}
