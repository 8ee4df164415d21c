//! End-to-end tests for the starfield simulation.
//!
//! These drive the public API the way a host would: build a field or a whole
//! [`Starfield`], feed it frames and pointer input, and check the observable
//! positions.

use starfield::prelude::*;
use starfield::{client_to_ndc, CameraState, ClockConfig, OrbitConfig, Ray, RepulsionField, Star};

fn far_pointer() -> Vec3 {
    Vec3::new(5000.0, 0.0, 0.0)
}

fn config(count: u32, seed: u64) -> StarfieldConfig {
    StarfieldConfig::default().with_star_count(count).with_seed(seed)
}

// ============================================================================
// Particle field
// ============================================================================

#[test]
fn test_drift_only_moves_by_velocity() {
    let mut field = ParticleField::new(&config(1000, 42)).unwrap();

    for _ in 0..100 {
        let before: Vec<Vec3> = field.positions().to_vec();
        let stats = field.step(0.016, far_pointer());
        assert_eq!(stats.repelled, 0);
        assert_eq!(stats.reseeded, 0);

        for ((old, new), star) in before.iter().zip(field.positions()).zip(field.stars()) {
            // f32 positions near the shell edge round at a few ULPs of |p|.
            let rounding = old.length() * f32::EPSILON * 4.0;
            let moved = (*new - *old).length();
            assert!(moved <= star.velocity.length() + rounding);
        }
    }
    assert_eq!(field.generation(), 100);
}

#[test]
fn test_pointer_on_star_pushes_it_away() {
    let star = Star::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.001, 0.0, 0.0), Vec3::ONE);
    let mut field = ParticleField::from_stars(&config(1, 5), vec![star]).unwrap();
    let pointer = star.position;

    field.step(0.016, pointer);

    let moved = field.positions()[0];
    let before_xy = (star.position - pointer).truncate().length();
    let after_xy = (moved - pointer).truncate().length();
    assert!(after_xy > before_xy);
    assert!(moved.x > star.position.x);
    assert!(moved.length() <= 600.0);
}

#[test]
fn test_positions_stay_inside_wrap_radius() {
    let mut field = ParticleField::new(&config(2000, 9)).unwrap();
    let pointers = [
        Vec3::ZERO,
        Vec3::new(60.0, 0.0, 0.0),
        Vec3::new(-200.0, 150.0, 0.0),
        Vec3::new(0.0, 0.0, 480.0),
    ];

    for frame in 0..200 {
        let pointer = pointers[frame % pointers.len()];
        field.step(0.016, pointer);
        for p in field.positions() {
            assert!(p.is_finite());
            assert!(p.length() <= 600.0, "star escaped to {:?}", p);
        }
    }
}

#[test]
fn test_reseed_keeps_velocity_and_color() {
    let star = Star::new(
        Vec3::new(599.9, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.2, 0.4, 0.8),
    );
    let mut field = ParticleField::from_stars(&config(1, 3), vec![star]).unwrap();

    let stats = field.step(0.016, far_pointer());

    assert_eq!(stats.reseeded, 1);
    let reseeded = field.stars()[0];
    let r = reseeded.position.length();
    assert!((100.0..=500.0 + 1e-3).contains(&r), "radius {}", r);
    assert_eq!(reseeded.velocity, star.velocity);
    assert_eq!(reseeded.color, star.color);
}

#[test]
fn test_same_seed_same_run() {
    let mut a = ParticleField::new(&config(500, 77)).unwrap();
    let mut b = ParticleField::new(&config(500, 77)).unwrap();
    for _ in 0..20 {
        a.step(0.016, Vec3::new(30.0, 20.0, 0.0));
        b.step(0.016, Vec3::new(30.0, 20.0, 0.0));
    }
    assert_eq!(a.positions(), b.positions());
}

#[test]
fn test_repulsion_zero_at_radius_and_bounded() {
    let field = RepulsionField::default();
    assert_eq!(field.force_scale(field.radius), 0.0);
    assert_eq!(field.force_scale(field.radius * 2.0), 0.0);

    let pointer = Vec3::new(1.0, -2.0, 0.0);
    let max_planar = field.strength * field.jitter_max;
    let max_depth = field.strength * field.depth_nudge;
    for i in 0..200 {
        let a = i as f32 * 0.37;
        let scale = i as f32 / 200.0;
        let offset = Vec3::new(a.cos() * 20.0, a.sin() * 20.0, (a * 3.0).sin() * 30.0) * scale;
        let push = field
            .displacement(pointer + offset, pointer, || field.jitter_max)
            .unwrap_or(Vec3::ZERO);
        assert!(push.truncate().length() <= max_planar + 1e-3);
        assert!(push.z.abs() <= max_depth + 1e-4);
    }
}

// ============================================================================
// Pointer projection
// ============================================================================

#[test]
fn test_ndc_reference_points() {
    let rect = SurfaceRect::new(0.0, 0.0, 200.0, 100.0);
    assert_eq!(client_to_ndc(Vec2::new(100.0, 50.0), rect), Some(Vec2::ZERO));
    assert_eq!(client_to_ndc(Vec2::new(0.0, 0.0), rect), Some(Vec2::new(-1.0, 1.0)));
    assert_eq!(client_to_ndc(Vec2::new(200.0, 100.0), rect), Some(Vec2::new(1.0, -1.0)));
}

#[test]
fn test_parallel_projection_has_no_intersection() {
    let camera = CameraState {
        position: Vec3::new(0.0, 0.0, 10.0),
        target: Vec3::new(10.0, 0.0, 10.0),
        up: Vec3::Y,
        fov_y: 1.0,
        aspect: 1.0,
        near: 0.1,
        far: 100.0,
    };
    assert!(PointerProjector::project(Vec2::ZERO, &camera, &Plane::Z0).is_none());

    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::X).unwrap();
    assert!(ray.intersect_plane(&Plane::Z0).is_none());
}

#[test]
fn test_pointer_reaches_field_through_frames() {
    let mut app = Starfield::init(config(300, 21)).unwrap();
    app.resize(200, 100);
    app.pointer_moved(Vec2::new(150.0, 50.0), SurfaceRect::from_size(200, 100));
    app.frame(0.0);

    let pointer = app.pointer().world_position();
    assert!(pointer.x > 0.0);
    assert!(pointer.z.abs() < 1e-3);
    assert_eq!(app.field().last_pointer(), pointer);
}

// ============================================================================
// Clock and orbits
// ============================================================================

#[test]
fn test_clock_delta_never_exceeds_clamp() {
    let mut clock = FrameClock::new(&ClockConfig::default());
    let mut now = 0.0;
    for gap in [0.0, 5.0, 16.7, 33.0, 100.0, 2500.0, 16.7] {
        now += gap;
        let dt = clock.tick(now);
        assert!((0.0..=0.033).contains(&dt));
    }
}

#[test]
fn test_orbits_restore_from_saved_clock() {
    let mut running = OrbitDriver::new(&OrbitConfig::default());
    for _ in 0..500 {
        running.advance(0.016);
    }

    let mut restored = OrbitDriver::new(&OrbitConfig::default());
    restored.set_t_orbit(running.t_orbit());

    for (a, b) in running.bodies().iter().zip(restored.bodies()) {
        assert_eq!(a.transform().position, b.transform().position);
    }
}

// ============================================================================
// Headless host
// ============================================================================

struct CountingHost {
    now: f64,
    remaining: u32,
    stop: StopSignal,
    max_dt: f32,
}

impl FrameHost for CountingHost {
    fn now_ms(&mut self) -> f64 {
        // Irregular frames, including one long stall.
        self.now += if self.remaining == 10 { 1500.0 } else { 16.0 };
        self.now
    }

    fn present(&mut self, app: &mut Starfield, report: &FrameReport) {
        assert!(app.take_positions_dirty());
        self.max_dt = self.max_dt.max(report.dt);
        self.remaining -= 1;
        if self.remaining == 0 {
            self.stop.stop();
        }
    }
}

#[test]
fn test_headless_run_loop() {
    let mut app = Starfield::init(config(400, 8)).unwrap();
    let stop = StopSignal::new();
    let mut host = CountingHost {
        now: 0.0,
        remaining: 30,
        stop: stop.clone(),
        max_dt: 0.0,
    };

    let frames = starfield::run_loop(&mut app, &mut host, &stop);

    assert_eq!(frames, 30);
    assert_eq!(app.field().generation(), 30);
    assert!(host.max_dt <= 0.033);
    for p in app.field().positions() {
        assert!(p.length() <= 600.0);
    }
    app.teardown();
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("starfield-config-{}.json", std::process::id()));
    let config = config(1234, 99).with_drift_mode(DriftMode::TimeScaled { reference_fps: 60.0 });

    config.save(&path).unwrap();
    let loaded = StarfieldConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
}
