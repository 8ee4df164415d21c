//! Frame timing.
//!
//! [`FrameClock`] turns host timestamps into a clamped per-frame delta and
//! keeps a smoothed FPS estimate for display.
//!
//! # Example
//!
//! ```ignore
//! use starfield::time::FrameClock;
//!
//! let mut clock = FrameClock::default();
//!
//! // In your frame callback, with the host's millisecond timestamp:
//! let dt = clock.tick(now_ms);
//!
//! println!("Delta: {:.4}s", dt);
//! println!("FPS: {:.0}", clock.fps());
//! ```

use crate::config::ClockConfig;
use std::time::Instant;

/// Clamped delta time plus an exponential moving average of the frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Host timestamp of the previous tick in milliseconds.
    last_timestamp: Option<f64>,
    /// Delta returned by the last tick in seconds.
    delta_secs: f32,
    /// Smoothed frames per second.
    smoothed_fps: f32,
    /// Total ticks since creation.
    frame_count: u64,
    /// Upper clamp on the delta in seconds.
    max_delta: f32,
    /// Weight kept from the previous FPS estimate.
    smoothing: f32,
    /// Reference point for [`tick_instant`](Self::tick_instant).
    epoch: Instant,
}

impl FrameClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            last_timestamp: None,
            delta_secs: 0.0,
            smoothed_fps: config.initial_fps,
            frame_count: 0,
            max_delta: config.max_delta,
            smoothing: config.fps_smoothing,
            epoch: Instant::now(),
        }
    }

    /// Clock whose previous frame happened at `now_ms`.
    pub fn starting_at(config: &ClockConfig, now_ms: f64) -> Self {
        let mut clock = Self::new(config);
        if now_ms.is_finite() {
            clock.last_timestamp = Some(now_ms);
        }
        clock
    }

    /// Register a frame at host time `now_ms` and return its delta in seconds.
    ///
    /// The delta is `min(max_delta, (now - last) / 1000)`. The first tick and
    /// a clock running backwards yield 0. A non-finite timestamp is rejected:
    /// the delta is 0 and the previous timestamp is kept.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            log::warn!("rejected non-finite frame timestamp {}", now_ms);
            self.delta_secs = 0.0;
            return 0.0;
        }

        let raw = match self.last_timestamp {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        self.delta_secs = raw.clamp(0.0, self.max_delta);
        self.frame_count += 1;

        let fps = if self.delta_secs > 0.0 {
            1.0 / self.delta_secs
        } else {
            60.0
        };
        self.smoothed_fps = self.smoothed_fps * self.smoothing + fps * (1.0 - self.smoothing);

        self.delta_secs
    }

    /// [`tick`](Self::tick) with a monotonic instant instead of a host timestamp.
    pub fn tick_instant(&mut self, now: Instant) -> f32 {
        self.tick(self.millis_since_epoch(now))
    }

    /// Milliseconds from clock creation to `now`.
    pub fn millis_since_epoch(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0
    }

    /// Delta returned by the last tick in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Smoothed frames per second. Display only.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Total ticks so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Timestamp of the last accepted tick.
    #[inline]
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(1234.0), 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_regular_frames() {
        let mut clock = FrameClock::starting_at(&ClockConfig::default(), 0.0);
        let dt = clock.tick(16.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped_after_stall() {
        let mut clock = FrameClock::starting_at(&ClockConfig::default(), 0.0);
        let mut now = 0.0;
        for gap in [1.0, 16.0, 33.0, 34.0, 500.0, 60_000.0, 1e9] {
            now += gap;
            let dt = clock.tick(now);
            assert!(dt <= 0.033, "dt {} after gap {}", dt, gap);
        }
        assert_eq!(clock.delta(), 0.033);
    }

    #[test]
    fn test_backwards_clock_gives_zero() {
        let mut clock = FrameClock::starting_at(&ClockConfig::default(), 1000.0);
        assert_eq!(clock.tick(900.0), 0.0);
        assert!((clock.tick(916.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_timestamp_holds_previous() {
        let mut clock = FrameClock::starting_at(&ClockConfig::default(), 100.0);
        assert_eq!(clock.tick(f64::NAN), 0.0);
        assert_eq!(clock.last_timestamp(), Some(100.0));
        assert!((clock.tick(116.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_fps_moving_average() {
        let mut clock = FrameClock::starting_at(&ClockConfig::default(), 0.0);
        clock.tick(10.0);
        // 60 * 0.9 + 100 * 0.1
        assert!((clock.fps() - 64.0).abs() < 1e-3);

        let mut now = 10.0;
        for _ in 0..200 {
            now += 20.0;
            clock.tick(now);
        }
        assert!((clock.fps() - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_tick_instant_uses_epoch() {
        let mut clock = FrameClock::default();
        let later = clock.epoch + std::time::Duration::from_millis(20);
        clock.tick_instant(clock.epoch);
        let dt = clock.tick_instant(later);
        assert!((dt - 0.02).abs() < 1e-6);
    }
}
