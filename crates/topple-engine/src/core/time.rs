/// Fixed timestep accumulator.
/// Game logic and physics advance in equal slices regardless of frame time.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    /// Upper bound on steps per frame, so a long stall does not snowball.
    max_steps: u32,
    /// Simulated seconds consumed so far.
    elapsed: f64,
}

impl FixedTimestep {
    pub const DEFAULT_MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self::with_max_steps(dt, Self::DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            elapsed: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        self.elapsed += steps as f64 * self.dt as f64;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_frames_carry_over() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
        assert_eq!(ts.accumulate(0.016), 1);
    }

    #[test]
    fn stall_is_capped() {
        let mut ts = FixedTimestep::with_max_steps(1.0 / 60.0, 4);
        assert_eq!(ts.accumulate(1.0), 4);
    }

    #[test]
    fn elapsed_counts_whole_steps_only() {
        let mut ts = FixedTimestep::new(0.5);
        ts.accumulate(1.2);
        assert!((ts.elapsed() - 1.0).abs() < 1e-9);
        ts.reset();
        assert_eq!(ts.elapsed(), 0.0);
    }

    #[test]
    fn negative_frame_time_is_ignored() {
        let mut ts = FixedTimestep::new(0.1);
        assert_eq!(ts.accumulate(-5.0), 0);
        assert_eq!(ts.accumulate(0.1), 1);
    }
}
