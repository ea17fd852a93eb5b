//! Simulation clock

/// Fixed-step simulation time.
///
/// Behaviors never read wall-clock time; the host advances this clock once
/// per simulation tick and hands `elapsed()` to the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    elapsed: f32,
    delta: f32,
    ticks: u64,
}

impl Time {
    /// Create a clock at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta.max(0.0);
        self.elapsed += self.delta;
        self.ticks += 1;
    }

    /// Seconds since the clock started
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of the last tick in seconds
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Number of ticks advanced so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_advance() {
        let mut time = Time::new();
        time.advance(0.1);
        time.advance(0.1);

        assert_eq!(time.ticks(), 2);
        assert!((time.elapsed() - 0.2).abs() < 1e-6);
        assert!((time.delta_seconds() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_time_negative_delta_ignored() {
        let mut time = Time::new();
        time.advance(-1.0);

        assert_eq!(time.elapsed(), 0.0);
    }
}
