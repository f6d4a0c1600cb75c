//! Simulation timing.
//!
//! Provides a fixed-timestep clock for the interaction simulation. In
//! realtime mode frame deltas come from the wall clock and the loop is paced;
//! otherwise every frame advances exactly one fixed step, which keeps runs
//! deterministic.

use std::time::{Duration, Instant};

/// Maximum fixed updates performed for a single frame.
const MAX_UPDATES_PER_FRAME: u32 = 10;

/// Fixed-timestep simulation clock.
#[derive(Debug)]
pub struct SimulationClock {
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Maximum delta time to prevent spiral of death
    max_dt: f32,
    /// Accumulator for fixed timestep
    accumulator: f32,
    /// Simulated seconds stepped so far
    elapsed: f64,
    /// Fixed steps performed so far
    steps: u64,
    /// Measure frame deltas against the wall clock
    realtime: bool,
    /// Time of last frame start
    last_frame: Instant,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl SimulationClock {
    /// Create a simulated (non-realtime) clock.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            max_dt: 0.25,
            accumulator: 0.0,
            elapsed: 0.0,
            steps: 0,
            realtime: false,
            last_frame: Instant::now(),
        }
    }

    /// Create with realtime setting.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Simulated seconds stepped so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fixed steps performed so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Delta for the next frame.
    pub fn frame_delta(&mut self) -> f32 {
        if !self.realtime {
            return self.fixed_dt;
        }

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        // Clamp to prevent spiral of death
        dt.min(self.max_dt)
    }

    /// Accumulate time for fixed timestep updates.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        // Small slack so a frame of exactly one step always yields one update
        let threshold = self.fixed_dt - f32::EPSILON;
        while self.accumulator >= threshold && count < MAX_UPDATES_PER_FRAME {
            self.accumulator = (self.accumulator - self.fixed_dt).max(0.0);
            count += 1;
        }

        // If we're still behind, reset accumulator
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.steps += u64::from(count);
        self.elapsed += f64::from(self.fixed_dt) * f64::from(count);
        count
    }

    /// Sleep for the remainder of the step (realtime mode only).
    pub fn pace(&self) {
        if !self.realtime {
            return;
        }

        let budget = Duration::from_secs_f32(self.fixed_dt);
        let elapsed = self.last_frame.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    /// Reset timing.
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.elapsed = 0.0;
        self.steps = 0;
    }
}
