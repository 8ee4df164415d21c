//! Orbiting planets.
//!
//! Planet positions are closed-form functions of a single orbit clock
//! `t_orbit`, so any state can be restored from that one number. Spins are
//! accumulated per frame from `dt`.

use crate::config::{OrbitBodyConfig, OrbitConfig};
use glam::{Quat, Vec3};

/// Local placement of a body inside the rotating planet group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    /// Spin around the local Y axis in radians.
    pub spin: f32,
}

/// A planet and its current transform.
#[derive(Debug, Clone)]
pub struct OrbitBody {
    config: OrbitBodyConfig,
    transform: BodyTransform,
}

impl OrbitBody {
    pub fn new(config: OrbitBodyConfig) -> Self {
        let transform = BodyTransform {
            position: config.initial_position,
            spin: 0.0,
        };
        Self { config, transform }
    }

    /// Position on the path at orbit time `t`.
    pub fn position_at(&self, t: f32) -> Vec3 {
        let [x, y, z] = &self.config.path;
        Vec3::new(x.eval(t), y.eval(t), z.eval(t))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.config.color
    }

    #[inline]
    pub fn transform(&self) -> BodyTransform {
        self.transform
    }
}

/// Advances every body from the shared orbit clock.
#[derive(Debug, Clone)]
pub struct OrbitDriver {
    t_orbit: f64,
    base_rate: f32,
    group_rotation: f32,
    group_rotation_rate: f32,
    bodies: Vec<OrbitBody>,
}

impl OrbitDriver {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            t_orbit: 0.0,
            base_rate: config.base_rate,
            group_rotation: 0.0,
            group_rotation_rate: config.group_rotation_rate,
            bodies: config.bodies.iter().cloned().map(OrbitBody::new).collect(),
        }
    }

    /// Advance the orbit clock by `dt * base_rate` and re-evaluate positions.
    ///
    /// Spins and the group rotation accumulate `dt * rate`. Non-finite or
    /// negative `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("orbit driver ignored frame delta {}", dt);
            return;
        }
        self.t_orbit += dt as f64 * self.base_rate as f64;
        self.group_rotation += dt * self.group_rotation_rate;
        for body in &mut self.bodies {
            body.transform.spin += dt * body.config.spin_rate;
        }
        self.evaluate();
    }

    /// Jump the orbit clock to `t_orbit` without touching spins.
    pub fn set_t_orbit(&mut self, t_orbit: f64) {
        if t_orbit.is_finite() {
            self.t_orbit = t_orbit;
            self.evaluate();
        }
    }

    fn evaluate(&mut self) {
        let t = self.t_orbit as f32;
        for body in &mut self.bodies {
            body.transform.position = body.position_at(t);
        }
    }

    #[inline]
    pub fn t_orbit(&self) -> f64 {
        self.t_orbit
    }

    /// Rotation of the whole planet group around Y in radians.
    #[inline]
    pub fn group_rotation(&self) -> f32 {
        self.group_rotation
    }

    #[inline]
    pub fn bodies(&self) -> &[OrbitBody] {
        &self.bodies
    }

    /// World position of a body with the group rotation applied.
    pub fn world_position(&self, body: &OrbitBody) -> Vec3 {
        Quat::from_rotation_y(self.group_rotation) * body.transform.position
    }
}
