//! The starfield application and its frame loop.
//!
//! [`Starfield`] owns every piece of simulation state: clock, camera, pointer,
//! star field and planets. The host drives it through an explicit lifecycle:
//!
//! - [`Starfield::init`] builds everything from a validated config
//! - [`Starfield::resize`] follows surface size changes
//! - [`Starfield::pointer_moved`] records raw pointer input (last value wins)
//! - [`Starfield::frame`] runs one frame
//! - [`Starfield::teardown`] ends the run
//!
//! Hosts without their own event loop can use [`run_loop`], which repeats
//! `tick -> step -> present` until a [`StopSignal`] fires.

use crate::camera::{CameraRig, CameraState};
use crate::config::StarfieldConfig;
use crate::error::ConfigError;
use crate::field::{ParticleField, StepStats};
use crate::orbit::OrbitDriver;
use crate::pointer::{PointerState, SurfaceRect};
use crate::time::FrameClock;
use glam::Vec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Summary of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Clamped delta used for this frame in seconds.
    pub dt: f32,
    /// Smoothed frames per second.
    pub fps: f32,
    /// Generation of the published star positions.
    pub generation: u64,
    pub stats: StepStats,
}

/// Simulation state for the whole backdrop.
pub struct Starfield {
    config: StarfieldConfig,
    clock: FrameClock,
    camera: CameraRig,
    pointer: PointerState,
    pending_pointer: Option<(Vec2, SurfaceRect)>,
    field: ParticleField,
    orbits: OrbitDriver,
}

impl Starfield {
    /// Validate `config` and build the initial state.
    pub fn init(config: StarfieldConfig) -> Result<Self, ConfigError> {
        let field = ParticleField::new(&config)?;
        let orbits = OrbitDriver::new(&config.orbit);
        let camera = CameraRig::new(config.camera, 1.0);
        let clock = FrameClock::new(&config.clock);
        Ok(Self {
            config,
            clock,
            camera,
            pointer: PointerState::new(),
            pending_pointer: None,
            field,
            orbits,
        })
    }

    /// Follow a change of the render surface size in pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("surface resized to {}x{}", width, height);
        self.camera.resize(width, height);
    }

    /// Record raw pointer input in client pixels.
    ///
    /// Only the latest event before a frame is used; it is projected at the
    /// start of that frame so the whole pass sees one pointer position.
    pub fn pointer_moved(&mut self, client: Vec2, rect: SurfaceRect) {
        self.pending_pointer = Some((client, rect));
    }

    /// Run one frame at host time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let dt = self.clock.tick(now_ms);
        self.camera.update(now_ms);

        if let Some((client, rect)) = self.pending_pointer.take() {
            self.pointer.update_from_client(
                client,
                rect,
                self.camera.state(),
                &self.config.reference_plane,
            );
        }

        let stats = self.field.step(dt, self.pointer.world_position());
        self.orbits.advance(dt);

        FrameReport {
            frame: self.clock.frame(),
            dt,
            fps: self.clock.fps(),
            generation: self.field.generation(),
            stats,
        }
    }

    /// End the run.
    pub fn teardown(self) {
        log::debug!(
            "starfield torn down after {} frames ({} stars)",
            self.clock.frame(),
            self.field.len()
        );
    }

    #[inline]
    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Whether star positions changed since the last call; clears the flag.
    pub fn take_positions_dirty(&mut self) -> bool {
        self.field.take_dirty()
    }

    #[inline]
    pub fn orbits(&self) -> &OrbitDriver {
        &self.orbits
    }

    #[inline]
    pub fn camera(&self) -> &CameraState {
        self.camera.state()
    }

    #[inline]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

/// Cloneable flag that ends a [`run_loop`].
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Host side of [`run_loop`].
pub trait FrameHost {
    /// Current host time in milliseconds.
    fn now_ms(&mut self) -> f64;

    /// Latest pointer input since the previous frame, if any.
    fn poll_pointer(&mut self) -> Option<(Vec2, SurfaceRect)> {
        None
    }

    /// Consume the finished frame.
    fn present(&mut self, app: &mut Starfield, report: &FrameReport);
}

/// Run frames until `stop` fires. Returns the number of frames run.
pub fn run_loop<H: FrameHost>(app: &mut Starfield, host: &mut H, stop: &StopSignal) -> u64 {
    log::debug!("run loop started");
    let mut frames = 0;
    while !stop.is_stopped() {
        if let Some((client, rect)) = host.poll_pointer() {
            app.pointer_moved(client, rect);
        }
        let now = host.now_ms();
        let report = app.frame(now);
        host.present(app, &report);
        frames += 1;
    }
    log::debug!("run loop stopped after {} frames", frames);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn small_config() -> StarfieldConfig {
        StarfieldConfig::default().with_star_count(200).with_seed(3)
    }

    struct ScriptedHost {
        now: f64,
        frames_left: u32,
        stop: StopSignal,
        pointer: Option<(Vec2, SurfaceRect)>,
        generations: Vec<u64>,
    }

    impl FrameHost for ScriptedHost {
        fn now_ms(&mut self) -> f64 {
            self.now += 16.0;
            self.now
        }

        fn poll_pointer(&mut self) -> Option<(Vec2, SurfaceRect)> {
            self.pointer.take()
        }

        fn present(&mut self, app: &mut Starfield, report: &FrameReport) {
            assert!(app.take_positions_dirty());
            self.generations.push(report.generation);
            self.frames_left -= 1;
            if self.frames_left == 0 {
                self.stop.stop();
            }
        }
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        assert!(Starfield::init(small_config().with_star_count(0)).is_err());
    }

    #[test]
    fn test_run_loop_until_stopped() {
        let mut app = Starfield::init(small_config()).unwrap();
        let stop = StopSignal::new();
        let mut host = ScriptedHost {
            now: 0.0,
            frames_left: 5,
            stop: stop.clone(),
            pointer: None,
            generations: Vec::new(),
        };
        let frames = run_loop(&mut app, &mut host, &stop);
        assert_eq!(frames, 5);
        assert_eq!(host.generations, vec![1, 2, 3, 4, 5]);
        assert_eq!(app.clock().frame(), 5);
        app.teardown();
    }

    #[test]
    fn test_stopped_signal_runs_nothing() {
        let mut app = Starfield::init(small_config()).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        let mut host = ScriptedHost {
            now: 0.0,
            frames_left: 1,
            stop: stop.clone(),
            pointer: None,
            generations: Vec::new(),
        };
        assert_eq!(run_loop(&mut app, &mut host, &stop), 0);
    }

    #[test]
    fn test_pointer_projected_at_frame_start() {
        let mut app = Starfield::init(small_config()).unwrap();
        app.resize(200, 100);
        let rect = SurfaceRect::from_size(200, 100);
        app.pointer_moved(Vec2::new(10.0, 10.0), rect);
        app.pointer_moved(Vec2::new(100.0, 50.0), rect);
        assert_eq!(app.pointer().updates(), 0);

        app.frame(0.0);
        // Only the last event counts, and the view center lands on the origin.
        assert_eq!(app.pointer().updates(), 1);
        assert!(app.pointer().world_position().length() < 1e-3);
        assert_eq!(app.field().last_pointer(), app.pointer().world_position());
    }

    #[test]
    fn test_pointer_sticky_without_events() {
        let mut app = Starfield::init(small_config()).unwrap();
        app.resize(200, 100);
        app.pointer_moved(Vec2::new(150.0, 25.0), SurfaceRect::from_size(200, 100));
        app.frame(0.0);
        let held = app.pointer().world_position();
        app.frame(16.0);
        app.frame(32.0);
        assert_eq!(app.pointer().world_position(), held);
        assert_ne!(held, Vec3::ZERO);
    }

    #[test]
    fn test_frame_advances_orbits_and_camera() {
        let mut app = Starfield::init(small_config()).unwrap();
        app.frame(0.0);
        let report = app.frame(20.0);
        assert!((report.dt - 0.02).abs() < 1e-6);
        assert!((app.orbits().t_orbit() - 0.005).abs() < 1e-6);
        assert!(app.camera().position.z > 60.0);
    }
}
