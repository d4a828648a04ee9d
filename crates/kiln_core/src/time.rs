//! Fixed-step time
//!
//! The simulation advances at a fixed tick rate on its own thread. The render
//! thread runs at display pace and blends the last two completed ticks using
//! an interpolation alpha derived from [`InterpolationClock`].

use std::time::{Duration, Instant};

/// Default simulation tick rate (60 Hz = 16.666ms per tick)
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Duration of a single tick at `tick_rate_hz`. A rate of zero is treated as 1 Hz;
/// settings validation rejects it before it gets here.
pub fn tick_duration(tick_rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)))
}

/// Simulation time tracker
pub struct SimulationTime {
    tick: Duration,
    tick_count: u64,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            tick_count: 0,
            accumulated_time: Duration::ZERO,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Fixed delta handed to the simulation step, in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new(tick_duration(DEFAULT_TICK_RATE_HZ))
    }
}

/// Deadline-based pacing for the simulation thread.
///
/// Exactly one tick runs per wake. When a tick overruns its slot the deadline is
/// re-anchored to the current instant instead of firing extra ticks to catch up.
pub struct FixedStepScheduler {
    tick: Duration,
    deadline: Instant,
}

impl FixedStepScheduler {
    pub fn new(tick: Duration, now: Instant) -> Self {
        Self {
            tick,
            deadline: now + tick,
        }
    }

    /// Time to sleep before the next tick, advancing the deadline by one slot.
    pub fn next_sleep(&mut self, now: Instant) -> Duration {
        let sleep = self.deadline.saturating_duration_since(now);
        if sleep.is_zero() {
            self.deadline = now + self.tick;
        } else {
            self.deadline += self.tick;
        }
        sleep
    }

    /// Block the calling thread until the next tick boundary.
    pub fn wait(&mut self) {
        let sleep = self.next_sleep(Instant::now());
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }
}

/// Render-thread accumulator that turns wall time into an interpolation alpha.
///
/// The accumulator restarts whenever the renderable store reports a new
/// generation (a completed simulation tick), so alpha measures progress since the
/// most recent tick, clamped to `[0, 1]`.
pub struct InterpolationClock {
    tick: Duration,
    accumulated: Duration,
    last_frame: Option<Instant>,
    generation: u64,
}

impl InterpolationClock {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            accumulated: Duration::ZERO,
            last_frame: None,
            generation: 0,
        }
    }

    /// Sample alpha for the frame starting at `now`.
    pub fn alpha(&mut self, now: Instant, generation: u64) -> f32 {
        if let Some(last) = self.last_frame {
            self.accumulated += now.saturating_duration_since(last);
        }
        self.last_frame = Some(now);

        if generation != self.generation {
            self.generation = generation;
            self.accumulated = Duration::ZERO;
        }

        let tick = self.tick.as_secs_f32();
        if tick <= 0.0 {
            return 1.0;
        }
        (self.accumulated.as_secs_f32() / tick).clamp(0.0, 1.0)
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tick_duration_matches_rate() {
        assert_eq!(tick_duration(50), Duration::from_millis(20));
        assert_eq!(tick_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn simulation_time_advances_by_fixed_delta() {
        let mut time = SimulationTime::new(Duration::from_millis(10));
        time.advance_tick();
        time.advance_tick();
        assert_eq!(time.tick_count(), 2);
        assert_eq!(time.total_time(), Duration::from_millis(20));
        assert_relative_eq!(time.delta_seconds(), 0.01, epsilon = 1e-6);
    }

    #[test]
    fn scheduler_sleeps_until_next_boundary() {
        let t0 = Instant::now();
        let mut scheduler = FixedStepScheduler::new(Duration::from_millis(10), t0);

        assert_eq!(
            scheduler.next_sleep(t0 + Duration::from_millis(4)),
            Duration::from_millis(6)
        );
        // Deadline moved to t0 + 20ms.
        assert_eq!(
            scheduler.next_sleep(t0 + Duration::from_millis(15)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn scheduler_reanchors_instead_of_catching_up() {
        let t0 = Instant::now();
        let mut scheduler = FixedStepScheduler::new(Duration::from_millis(10), t0);

        // 25ms late: no sleep, and the next deadline is measured from now.
        assert_eq!(
            scheduler.next_sleep(t0 + Duration::from_millis(35)),
            Duration::ZERO
        );
        assert_eq!(
            scheduler.next_sleep(t0 + Duration::from_millis(40)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn alpha_grows_between_ticks_and_clamps() {
        let t0 = Instant::now();
        let mut clock = InterpolationClock::new(Duration::from_millis(20));

        assert_relative_eq!(clock.alpha(t0, 1), 0.0, epsilon = 1e-6);
        assert_relative_eq!(clock.alpha(t0 + Duration::from_millis(5), 1), 0.25, epsilon = 1e-6);
        assert_relative_eq!(clock.alpha(t0 + Duration::from_millis(10), 1), 0.5, epsilon = 1e-6);
        assert_relative_eq!(clock.alpha(t0 + Duration::from_millis(60), 1), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn alpha_restarts_on_new_generation() {
        let t0 = Instant::now();
        let mut clock = InterpolationClock::new(Duration::from_millis(20));
        clock.alpha(t0, 1);
        clock.alpha(t0 + Duration::from_millis(15), 1);

        assert_relative_eq!(clock.alpha(t0 + Duration::from_millis(21), 2), 0.0, epsilon = 1e-6);
        assert_relative_eq!(clock.alpha(t0 + Duration::from_millis(31), 2), 0.5, epsilon = 1e-6);
    }
}
