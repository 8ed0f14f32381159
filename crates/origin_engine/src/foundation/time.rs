//! Time management utilities

use std::time::{Duration, Instant};

/// Frame timer measuring real elapsed time between ticks, in seconds
pub struct Timer {
    last_frame: Instant,
    delta_time: f64,
    total_time: f64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f64();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count as f64 / self.total_time
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// Simulation time multiplier.
///
/// Scales real elapsed time into simulated time independently of the frame
/// rate. Adjusted in discrete decades and always kept within
/// [`TimeScale::MIN`, `TimeScale::MAX`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    value: f64,
}

impl TimeScale {
    /// Slowest allowed multiplier (real time)
    pub const MIN: f64 = 1.0;
    /// Fastest allowed multiplier
    pub const MAX: f64 = 1.0e6;
    /// Factor applied by one increment or decrement
    pub const STEP: f64 = 10.0;
    /// Multiplier used when nothing is configured
    pub const DEFAULT: f64 = 50.0;

    /// Create a time scale, clamping `value` into range
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(Self::MIN, Self::MAX),
        }
    }

    /// Current multiplier
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Multiply by [`TimeScale::STEP`], saturating at the maximum
    pub fn increase(&mut self) -> f64 {
        self.value = (self.value * Self::STEP).min(Self::MAX);
        self.value
    }

    /// Divide by [`TimeScale::STEP`], saturating at the minimum
    pub fn decrease(&mut self) -> f64 {
        self.value = (self.value / Self::STEP).max(Self::MIN);
        self.value
    }

    /// Simulated seconds for `real_dt` real seconds
    pub fn scale(&self, real_dt: f64) -> f64 {
        self.value * real_dt
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
