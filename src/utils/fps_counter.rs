use std::time::{Duration, Instant};

/// Frames per second, averaged over one-second windows.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
    accumulated_time: Duration,
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_update: start,
            frame_count: 0,
            accumulated_time: Duration::ZERO,
            current_fps: 0.0,
        }
    }

    pub fn update(&mut self) -> Option<f32> {
        self.update_at(Instant::now())
    }

    /// Counts one frame. Returns the new rate when a window closes.
    pub fn update_at(&mut self, now: Instant) -> Option<f32> {
        self.frame_count += 1;
        self.accumulated_time += now.saturating_duration_since(self.last_update);
        self.last_update = self.last_update.max(now);

        if self.accumulated_time.as_secs_f32() >= 1.0 {
            self.current_fps = self.frame_count as f32 / self.accumulated_time.as_secs_f32();
            self.accumulated_time = Duration::ZERO;
            self.frame_count = 0;
            return Some(self.current_fps);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::starting_at(start);
        let mut reported = None;
        for frame in 1..=50 {
            if let Some(rate) = fps.update_at(start + Duration::from_millis(frame * 20)) {
                reported = Some(rate);
            }
        }
        assert!((reported.unwrap() - 50.0).abs() < 1e-3);
        assert!((fps.current_fps - 50.0).abs() < 1e-3);
    }
}
