use std::time::{Duration, Instant};

/// How long the counter takes to reach a new target.
pub const COUNTER_DURATION: Duration = Duration::from_millis(420);

/// One running interpolation. Owned by the animator; dropping it is the
/// cancellation.
#[derive(Debug, Clone, Copy)]
struct Tween {
    start: u64,
    end: u64,
    started: Instant,
    duration: Duration,
}

impl Tween {
    /// Linear progress, floored to an integer. Returns `(value, done)`.
    fn sample(&self, now: Instant) -> (u64, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            return (self.end, true);
        }
        let start = self.start as f64;
        let value = start + (self.end as f64 - start) * t;
        (value.floor().max(0.0) as u64, false)
    }
}

/// Integer counter that eases toward its target once per frame.
#[derive(Debug, Clone)]
pub struct ValueAnimator {
    displayed: u64,
    target: u64,
    duration: Duration,
    tween: Option<Tween>,
}

impl ValueAnimator {
    /// Starts settled: no animation until the target first changes.
    pub fn new(value: u64) -> Self {
        Self::with_duration(value, COUNTER_DURATION)
    }

    pub fn with_duration(value: u64, duration: Duration) -> Self {
        Self {
            displayed: value,
            target: value,
            duration,
            tween: None,
        }
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Retarget. Any running tween is replaced by one that starts from the
    /// value currently on screen. Returns false if the target is unchanged.
    pub fn set_target(&mut self, target: u64, now: Instant) -> bool {
        if target == self.target {
            return false;
        }
        self.target = target;
        self.tween = Some(Tween {
            start: self.displayed,
            end: target,
            started: now,
            duration: self.duration,
        });
        true
    }

    /// Advance one frame. Returns the newly published value, if any.
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        let tween = self.tween?;
        let (value, done) = tween.sample(now);
        if done {
            self.tween = None;
        }
        if value == self.displayed {
            return None;
        }
        self.displayed = value;
        Some(value)
    }

    pub fn cancel(&mut self) {
        self.tween = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unchanged_target_does_not_animate() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(3000);
        assert!(!anim.set_target(3000, t0));
        assert!(!anim.is_animating());
        assert_eq!(anim.tick(t0 + ms(100)), None);
        assert_eq!(anim.displayed(), 3000);
    }

    #[test]
    fn test_settles_exactly_on_target() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(0);
        anim.set_target(3000, t0);

        assert_eq!(anim.tick(t0 + ms(210)), Some(1500));
        assert!(anim.is_animating());
        assert_eq!(anim.tick(t0 + ms(420)), Some(3000));
        assert!(!anim.is_animating());
        assert_eq!(anim.tick(t0 + ms(500)), None);
    }

    #[test]
    fn test_intermediate_values_are_floored() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::with_duration(0, ms(300));
        anim.set_target(10, t0);
        // 10 * 100/300 = 3.33
        assert_eq!(anim.tick(t0 + ms(100)), Some(3));
    }

    #[test]
    fn test_decreasing_never_overshoots() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(3000);
        anim.set_target(300, t0);
        let mut last = anim.displayed();
        for step in 1..=30 {
            if let Some(v) = anim.tick(t0 + ms(step * 16)) {
                assert!(v <= last);
                assert!(v >= 300);
                last = v;
            }
        }
        assert_eq!(anim.displayed(), 300);
    }

    #[test]
    fn test_retarget_mid_flight_starts_from_displayed() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(3000);
        anim.set_target(6000, t0);
        let mid = anim.tick(t0 + ms(210)).unwrap();
        assert_eq!(mid, 4500);

        // New target arrives before the first tween finishes.
        let t1 = t0 + ms(210);
        anim.set_target(9000, t1);
        let mut last = mid;
        for step in 1..=40 {
            if let Some(v) = anim.tick(t1 + ms(step * 16)) {
                assert!(v >= last, "jumped backward: {v} < {last}");
                last = v;
            }
        }
        assert_eq!(anim.displayed(), 9000);
    }

    #[test]
    fn test_reversal_mid_flight_is_continuous() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(3000);
        anim.set_target(6000, t0);
        let mid = anim.tick(t0 + ms(105)).unwrap();

        let t1 = t0 + ms(105);
        anim.set_target(3000, t1);
        // First frame of the new tween is at or below where we were.
        let first = anim.tick(t1 + ms(16)).unwrap();
        assert!(first <= mid);
        assert!(mid - first < 200);
        anim.tick(t1 + COUNTER_DURATION);
        assert_eq!(anim.displayed(), 3000);
    }

    #[test]
    fn test_cancel_stops_updates() {
        let t0 = Instant::now();
        let mut anim = ValueAnimator::new(0);
        anim.set_target(1000, t0);
        anim.tick(t0 + ms(100));
        let frozen = anim.displayed();
        anim.cancel();
        assert_eq!(anim.tick(t0 + ms(400)), None);
        assert_eq!(anim.displayed(), frozen);
    }
}
