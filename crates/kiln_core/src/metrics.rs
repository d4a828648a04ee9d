//! Frame timing over a rolling window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub struct FrameTimer {
    frame_start: Instant,
    frame_times: VecDeque<Duration>,
    capacity: usize,
}

impl FrameTimer {
    /// Average over the last `capacity` frames (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frame_start: Instant::now(),
            frame_times: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn end(&mut self) {
        self.record(self.frame_start.elapsed());
    }

    pub fn record(&mut self, frame_time: Duration) {
        if self.frame_times.len() == self.capacity {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
    }

    pub fn average(&self) -> Duration {
        match self.frame_times.len() {
            0 => Duration::ZERO,
            n => self.frame_times.iter().sum::<Duration>() / n as u32,
        }
    }

    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.average().as_secs_f64() * 1000.0
    }

    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        let min = self.frame_times.iter().min().copied().unwrap_or_default();
        let max = self.frame_times.iter().max().copied().unwrap_or_default();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}
