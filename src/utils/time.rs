use std::time::{Duration, Instant};

/// Frame clock for the render loop.
///
/// Ticks are driven by the caller so tests can feed synthetic instants.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start_time: Instant,
    last_update: Instant,
    /// Time between the last two ticks
    pub delta: Duration,
    /// Time from creation to the last tick
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start_time: start,
            last_update: start,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advances to `now`. Instants earlier than the previous tick count as zero delta.
    pub fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_update);
        self.elapsed = now.saturating_duration_since(self.start_time);
        self.last_update = self.last_update.max(now);
        self.frame_count += 1;
    }

    #[must_use]
    pub fn delta_ms(&self) -> f32 {
        self.delta.as_secs_f32() * 1000.0
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed.as_secs_f32() * 1000.0
    }

    #[must_use]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_elapsed_follow_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(16));
        clock.tick_at(start + Duration::from_millis(40));
        assert_eq!(clock.delta, Duration::from_millis(24));
        assert_eq!(clock.elapsed, Duration::from_millis(40));
        assert_eq!(clock.frame_count, 2);

        clock.tick_at(start);
        assert_eq!(clock.delta, Duration::ZERO);
    }
}
