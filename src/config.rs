//! Configuration types for the starfield.
//!
//! Every tunable constant lives in [`StarfieldConfig`]. The defaults reproduce
//! the reference backdrop; any field can be overridden through the `with_*`
//! builder methods or a JSON file loaded with [`StarfieldConfig::load`].
//!
//! ```ignore
//! use starfield::prelude::*;
//!
//! let config = StarfieldConfig::default()
//!     .with_star_count(50_000)
//!     .with_seed(7)
//!     .with_repulsion(RepulsionField { radius: 40.0, ..Default::default() });
//! config.validate()?;
//! ```

use crate::error::ConfigError;
use crate::pointer::Plane;
use crate::spawn::hex_to_rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A spherical shell `[r_min, r_max]` centered at the origin.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShellConfig {
    pub r_min: f32,
    pub r_max: f32,
}

impl ShellConfig {
    pub const fn new(r_min: f32, r_max: f32) -> Self {
        Self { r_min, r_max }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.r_min.is_finite() || !self.r_max.is_finite() {
            return Err(ConfigError::invalid(field, "radii must be finite"));
        }
        if self.r_min < 0.0 {
            return Err(ConfigError::invalid(field, "r_min must not be negative"));
        }
        if self.r_min > self.r_max {
            return Err(ConfigError::invalid(
                field,
                format!("r_min ({}) exceeds r_max ({})", self.r_min, self.r_max),
            ));
        }
        Ok(())
    }
}

/// Force profile of the pointer repulsion.
///
/// A star closer than `radius` (measured with the depth axis scaled by
/// `depth_damping`) is pushed away from the pointer by
/// `strength * f^(1 + 3 * falloff)` where `f = 1 - dist / radius`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepulsionField {
    /// Effect radius in world units.
    pub radius: f32,
    /// Peak force scale.
    pub strength: f32,
    /// 0 flattens the profile, 1 concentrates it near the pointer.
    pub falloff: f32,
    /// Scale applied to the depth difference before measuring distance.
    pub depth_damping: f32,
    /// Lower bound of the per-star, per-frame planar jitter.
    pub jitter_min: f32,
    /// Upper bound of the per-star, per-frame planar jitter.
    pub jitter_max: f32,
    /// Depth push per unit of force, applied in the sign of the depth delta.
    pub depth_nudge: f32,
}

impl Default for RepulsionField {
    fn default() -> Self {
        Self {
            radius: 25.0,
            strength: 0.07,
            falloff: 0.8,
            depth_damping: 0.35,
            jitter_min: 15.0,
            jitter_max: 25.0,
            depth_nudge: 2.0,
        }
    }
}

impl RepulsionField {
    /// Exponent of the proximity term, `1 + 3 * falloff`.
    #[inline]
    pub fn exponent(&self) -> f32 {
        1.0 + 3.0 * self.falloff
    }

    fn validate(&self) -> Result<(), ConfigError> {
        finite_non_negative("repulsion.radius", self.radius)?;
        if self.radius == 0.0 {
            return Err(ConfigError::invalid("repulsion.radius", "must be positive"));
        }
        finite_non_negative("repulsion.strength", self.strength)?;
        if !(0.0..=1.0).contains(&self.falloff) {
            return Err(ConfigError::invalid(
                "repulsion.falloff",
                format!("must lie in [0, 1], got {}", self.falloff),
            ));
        }
        finite_non_negative("repulsion.depth_damping", self.depth_damping)?;
        finite_non_negative("repulsion.jitter_min", self.jitter_min)?;
        finite_non_negative("repulsion.jitter_max", self.jitter_max)?;
        if self.jitter_min > self.jitter_max {
            return Err(ConfigError::invalid("repulsion.jitter_min", "must not exceed jitter_max"));
        }
        finite_non_negative("repulsion.depth_nudge", self.depth_nudge)
    }
}

/// How the per-star drift velocity is applied each step.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum DriftMode {
    /// `position += velocity` once per frame, independent of `dt`.
    #[default]
    PerFrame,
    /// `position += velocity * dt * reference_fps`, frame-rate independent.
    TimeScaled { reference_fps: f32 },
}

/// Drift velocity generation and integration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    /// Per-axis velocity is drawn uniformly from `[-max_speed, max_speed)`.
    pub max_speed: f32,
    pub mode: DriftMode,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            max_speed: 0.001,
            mode: DriftMode::PerFrame,
        }
    }
}

/// HSL ranges used to tint the stars.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarColorConfig {
    pub hue: f32,
    pub hue_spread: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub lightness_spread: f32,
}

impl Default for StarColorConfig {
    fn default() -> Self {
        Self {
            hue: 0.58,
            hue_spread: 0.1,
            saturation: 0.6,
            lightness: 0.6,
            lightness_spread: 0.3,
        }
    }
}

/// Trigonometric basis of one orbit axis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Wave {
    Sin,
    Cos,
}

/// One coordinate of an orbit: `amplitude * wave(frequency * t + phase)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrbitAxis {
    pub amplitude: f32,
    pub frequency: f32,
    #[serde(default)]
    pub phase: f32,
    pub wave: Wave,
}

impl OrbitAxis {
    pub const fn sin(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
            wave: Wave::Sin,
        }
    }

    pub const fn cos(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
            wave: Wave::Cos,
        }
    }

    #[inline]
    pub fn eval(&self, t: f32) -> f32 {
        let angle = self.frequency * t + self.phase;
        match self.wave {
            Wave::Sin => self.amplitude * angle.sin(),
            Wave::Cos => self.amplitude * angle.cos(),
        }
    }
}

/// A planet: its look and its closed-form path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrbitBodyConfig {
    pub name: String,
    pub radius: f32,
    pub color: Vec3,
    /// x, y and z components of the path.
    pub path: [OrbitAxis; 3],
    /// Spin around the local Y axis in radians per second.
    pub spin_rate: f32,
    /// Placement before the first frame is evaluated.
    pub initial_position: Vec3,
}

/// Orbiting bodies and their shared clock.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitConfig {
    /// `t_orbit` advances by `dt * base_rate` each frame.
    pub base_rate: f32,
    /// Spin of the whole planet group around Y in radians per second.
    pub group_rotation_rate: f32,
    pub bodies: Vec<OrbitBodyConfig>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.25,
            group_rotation_rate: 0.05,
            bodies: vec![
                OrbitBodyConfig {
                    name: "blue".into(),
                    radius: 5.0,
                    color: hex_to_rgb(0x6aa2ff),
                    path: [
                        OrbitAxis::cos(22.0, 1.0),
                        OrbitAxis::sin(10.0, 1.2),
                        OrbitAxis::sin(-8.0, 1.0),
                    ],
                    spin_rate: 0.25,
                    initial_position: Vec3::new(-18.0, 0.0, 0.0),
                },
                OrbitBodyConfig {
                    name: "warm".into(),
                    radius: 3.5,
                    color: hex_to_rgb(0xffa15c),
                    path: [
                        OrbitAxis::cos(-30.0, 0.7),
                        OrbitAxis::sin(14.0, 0.9),
                        OrbitAxis::cos(12.0, 0.5),
                    ],
                    spin_rate: 0.35,
                    initial_position: Vec3::new(22.0, 8.0, -10.0),
                },
            ],
        }
    }
}

impl OrbitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        finite("orbit.base_rate", self.base_rate)?;
        finite("orbit.group_rotation_rate", self.group_rotation_rate)?;
        for body in &self.bodies {
            finite_non_negative("orbit.bodies.radius", body.radius)?;
            finite("orbit.bodies.spin_rate", body.spin_rate)?;
            let path_ok = body
                .path
                .iter()
                .all(|a| a.amplitude.is_finite() && a.frequency.is_finite() && a.phase.is_finite());
            if !path_ok {
                return Err(ConfigError::invalid(
                    "orbit.bodies.path",
                    format!("body `{}` has a non-finite path term", body.name),
                ));
            }
        }
        Ok(())
    }
}

/// Perspective camera and its slow dolly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Resting distance from the origin along +Z.
    pub distance: f32,
    pub dolly_amplitude: f32,
    /// Dolly phase rate in radians per millisecond of host time.
    pub dolly_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 2000.0,
            distance: 60.0,
            dolly_amplitude: 5.0,
            dolly_rate: 0.00025,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::invalid("camera.fov_y_degrees", "must lie in (0, 180)"));
        }
        finite_non_negative("camera.near", self.near)?;
        if self.near == 0.0 || !(self.far > self.near) || !self.far.is_finite() {
            return Err(ConfigError::invalid("camera.far", "requires 0 < near < far"));
        }
        finite("camera.distance", self.distance)?;
        finite("camera.dolly_amplitude", self.dolly_amplitude)?;
        finite("camera.dolly_rate", self.dolly_rate)
    }
}

/// Frame timing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Upper clamp on the frame delta in seconds.
    pub max_delta: f32,
    /// Weight of the previous estimate in the FPS moving average.
    pub fps_smoothing: f32,
    /// FPS estimate before the first frame.
    pub initial_fps: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.033,
            fps_smoothing: 0.9,
            initial_fps: 60.0,
        }
    }
}

impl ClockConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_delta.is_finite() && self.max_delta > 0.0) {
            return Err(ConfigError::invalid("clock.max_delta", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.fps_smoothing) {
            return Err(ConfigError::invalid("clock.fps_smoothing", "must lie in [0, 1)"));
        }
        finite_non_negative("clock.initial_fps", self.initial_fps)
    }
}

/// Complete starfield configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    pub star_count: u32,
    /// Shell the stars are first spawned in.
    pub spawn_shell: ShellConfig,
    /// Shell a star is redrawn from once it leaves `wrap_radius`.
    pub reseed_shell: ShellConfig,
    pub wrap_radius: f32,
    pub repulsion: RepulsionField,
    pub drift: DriftConfig,
    pub star_color: StarColorConfig,
    pub orbit: OrbitConfig,
    pub camera: CameraConfig,
    pub clock: ClockConfig,
    /// Plane the pointer ray is intersected with.
    pub reference_plane: Plane,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: 20_000,
            spawn_shell: ShellConfig::new(50.0, 500.0),
            reseed_shell: ShellConfig::new(100.0, 500.0),
            wrap_radius: 600.0,
            repulsion: RepulsionField::default(),
            drift: DriftConfig::default(),
            star_color: StarColorConfig::default(),
            orbit: OrbitConfig::default(),
            camera: CameraConfig::default(),
            clock: ClockConfig::default(),
            reference_plane: Plane::Z0,
            seed: None,
        }
    }
}

impl StarfieldConfig {
    /// Set the number of stars.
    pub fn with_star_count(mut self, count: u32) -> Self {
        self.star_count = count;
        self
    }

    /// Fix the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initial spawn shell.
    pub fn with_spawn_shell(mut self, r_min: f32, r_max: f32) -> Self {
        self.spawn_shell = ShellConfig::new(r_min, r_max);
        self
    }

    /// Set the shell wrapped stars are redrawn from.
    pub fn with_reseed_shell(mut self, r_min: f32, r_max: f32) -> Self {
        self.reseed_shell = ShellConfig::new(r_min, r_max);
        self
    }

    /// Set the distance beyond which a star is reseeded.
    pub fn with_wrap_radius(mut self, radius: f32) -> Self {
        self.wrap_radius = radius;
        self
    }

    /// Replace the repulsion profile.
    pub fn with_repulsion(mut self, repulsion: RepulsionField) -> Self {
        self.repulsion = repulsion;
        self
    }

    /// Choose how drift is integrated.
    pub fn with_drift_mode(mut self, mode: DriftMode) -> Self {
        self.drift.mode = mode;
        self
    }

    /// Replace the orbit setup.
    pub fn with_orbit(mut self, orbit: OrbitConfig) -> Self {
        self.orbit = orbit;
        self
    }

    /// Replace the camera setup.
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Replace the clock setup.
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// Set the plane the pointer is projected onto.
    pub fn with_reference_plane(mut self, plane: Plane) -> Self {
        self.reference_plane = plane;
        self
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    ///
    /// Fields absent from the file keep their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value, failing on the first one out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.star_count == 0 {
            return Err(ConfigError::invalid("star_count", "must be greater than 0"));
        }
        self.spawn_shell.validate("spawn_shell")?;
        self.reseed_shell.validate("reseed_shell")?;
        finite_non_negative("wrap_radius", self.wrap_radius)?;
        if self.wrap_radius <= self.reseed_shell.r_max {
            return Err(ConfigError::invalid(
                "wrap_radius",
                format!(
                    "must exceed reseed_shell.r_max ({}), got {}",
                    self.reseed_shell.r_max, self.wrap_radius
                ),
            ));
        }
        self.repulsion.validate()?;
        finite_non_negative("drift.max_speed", self.drift.max_speed)?;
        if let DriftMode::TimeScaled { reference_fps } = self.drift.mode {
            if !(reference_fps.is_finite() && reference_fps > 0.0) {
                return Err(ConfigError::invalid("drift.mode.reference_fps", "must be positive"));
            }
        }
        self.orbit.validate()?;
        self.camera.validate()?;
        self.clock.validate()?;
        if !self.reference_plane.is_valid() {
            return Err(ConfigError::invalid(
                "reference_plane",
                "normal must be finite and non-zero",
            ));
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn finite_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}
