/// Fixed timestep accumulator.
/// Turns variable frame times into a whole number of simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
    ticks: u64,
}

impl FixedTimestep {
    /// `max_steps` bounds how many ticks one frame may trigger.
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            ticks: 0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Drop backlog beyond the catch-up limit.
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        self.ticks += steps as u64;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Ticks handed out since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
        assert_eq!(ts.ticks(), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn caps_catch_up() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 4);
        assert_eq!(ts.accumulate(1.0), 4);
        assert_eq!(ts.ticks(), 4);
    }

    #[test]
    fn negative_frame_time_is_ignored() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(-1.0), 0);
        let a = ts.alpha();
        assert!((0.0..=1.0).contains(&a), "alpha was {}", a);
    }
}
