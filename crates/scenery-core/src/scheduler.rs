use crate::types::NodeId;
use std::time::{Duration, Instant};
use tracing::warn;

/// Shortest step the scheduler will run at.
const MIN_INTERVAL: Duration = Duration::from_nanos(1);

/// Fixed-step ticker holding the set of playing timelines.
///
/// The host calls `poll` from its render loop; a step is due only when more
/// than one interval has elapsed. The reference clock keeps the remainder so
/// steps do not drift.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    interval: Duration,
    then: Option<Instant>,
    registered: Vec<NodeId>,
}

impl UpdateScheduler {
    pub fn new(fps: f32) -> Self {
        Self {
            interval: Self::interval_for(fps),
            then: None,
            registered: Vec::new(),
        }
    }

    /// Rates below 1 fps run at 1 fps; rates too high to express run one
    /// step per nanosecond.
    fn interval_for(fps: f32) -> Duration {
        let interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1.0)));
        if interval < MIN_INTERVAL {
            warn!("Frame rate {} is out of range, clamping the step to {:?}", fps, MIN_INTERVAL);
            return MIN_INTERVAL;
        }
        interval
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.interval = Self::interval_for(fps);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resets the reference clock.
    pub fn start(&mut self, now: Instant) {
        self.then = Some(now);
    }

    /// Returns true when a step is due at `now`. The first poll only starts
    /// the clock.
    pub fn poll(&mut self, now: Instant) -> bool {
        let then = *self.then.get_or_insert(now);
        let elapsed = now.saturating_duration_since(then);
        if elapsed <= self.interval {
            return false;
        }
        let interval = self.interval.as_nanos();
        let remainder = Duration::from_nanos((elapsed.as_nanos() % interval) as u64);
        self.then = Some(now - remainder);
        true
    }

    /// Idempotent.
    pub fn add(&mut self, id: NodeId) {
        if !self.registered.contains(&id) {
            self.registered.push(id);
        }
    }

    /// Idempotent.
    pub fn remove(&mut self, id: NodeId) {
        self.registered.retain(|&r| r != id);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.registered.contains(&id)
    }

    /// Registered timelines in registration order.
    pub fn registered(&self) -> &[NodeId] {
        &self.registered
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_fires_after_interval_and_keeps_remainder() {
        let mut s = UpdateScheduler::new(10.0);
        let t0 = Instant::now();
        assert!(!s.poll(t0));
        assert!(!s.poll(t0 + Duration::from_millis(100)));
        assert!(s.poll(t0 + Duration::from_millis(130)));
        // 30ms carried over: the next step is due after 70ms more.
        assert!(!s.poll(t0 + Duration::from_millis(200)));
        assert!(s.poll(t0 + Duration::from_millis(201)));
    }

    #[test]
    fn test_huge_fps_clamps_to_a_nonzero_interval() {
        let mut s = UpdateScheduler::new(1.0e10);
        assert_eq!(s.interval(), MIN_INTERVAL);
        let t0 = Instant::now();
        assert!(!s.poll(t0));
        assert!(s.poll(t0 + Duration::from_millis(5)));

        s.set_fps(f32::INFINITY);
        assert_eq!(s.interval(), MIN_INTERVAL);
        assert!(s.poll(t0 + Duration::from_millis(10)));
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut s = UpdateScheduler::default();
        s.add(3);
        s.add(3);
        s.add(1);
        assert_eq!(s.registered(), &[3, 1]);
        s.remove(3);
        s.remove(3);
        assert_eq!(s.registered(), &[1]);
        assert!(!s.contains(3));
    }
}
