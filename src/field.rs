//! The star field: drift, pointer repulsion and re-seeding.
//!
//! [`ParticleField`] owns a fixed number of [`Star`] records. Each call to
//! [`ParticleField::step`] makes one pass over every star:
//!
//! 1. **Drift** - the star moves by its constant velocity.
//! 2. **Repulsion** - stars near the pointer are pushed away from it. The
//!    depth difference is scaled down before measuring distance, so the push
//!    is strongest around the focal plane.
//! 3. **Re-seeding** - a star beyond the wrap radius is moved back to a fresh
//!    random spot in the reseed shell. Its velocity and color are kept.
//!
//! Stars never read each other, so the pass is order independent. Positions
//! are written to a working buffer and only published to the render-facing
//! buffer once the whole pass is done; the generation counter advances once
//! per published pass.
//!
//! # Example
//!
//! ```ignore
//! let config = StarfieldConfig::default().with_star_count(1000).with_seed(1);
//! let mut field = ParticleField::new(&config)?;
//!
//! // Once per frame:
//! field.step(dt, pointer.world_position());
//! if field.take_dirty() {
//!     upload(field.position_data());
//! }
//! ```

use crate::config::{DriftConfig, DriftMode, RepulsionField, ShellConfig, StarfieldConfig};
use crate::error::ConfigError;
use crate::spawn::StarSpawner;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Added to every distance used as a divisor.
pub const DISTANCE_EPSILON: f32 = 1e-4;

/// One star.
///
/// `velocity` and `color` are chosen at spawn and never change afterwards.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Star {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
}

impl Star {
    pub fn new(position: Vec3, velocity: Vec3, color: Vec3) -> Self {
        Self {
            position,
            velocity,
            color,
        }
    }
}

impl RepulsionField {
    /// Offset from the pointer with the depth axis damped.
    #[inline]
    pub fn damped_delta(&self, position: Vec3, pointer: Vec3) -> Vec3 {
        let d = position - pointer;
        Vec3::new(d.x, d.y, d.z * self.depth_damping)
    }

    /// Force scale `strength * (1 - dist / radius)^(1 + 3 * falloff)`, zero at
    /// or beyond the radius.
    #[inline]
    pub fn force_scale(&self, dist: f32) -> f32 {
        if !(dist < self.radius) {
            return 0.0;
        }
        let proximity = 1.0 - dist / self.radius;
        self.strength * proximity.powf(self.exponent())
    }

    /// Displacement applied to a star at `position` by a pointer at `pointer`,
    /// or `None` when the star is outside the radius.
    ///
    /// A star inside the radius always gets `Some`, even when the push itself
    /// is zero (a star exactly under the pointer). The planar push runs along
    /// the damped offset and is scaled by a jitter factor per axis, drawn from
    /// `jitter` only when the star is inside the radius. The depth axis gets a
    /// fixed `depth_nudge * s` in the sign of the damped depth offset.
    pub fn displacement<F>(&self, position: Vec3, pointer: Vec3, mut jitter: F) -> Option<Vec3>
    where
        F: FnMut() -> f32,
    {
        let delta = self.damped_delta(position, pointer);
        let dist = delta.length();
        if !(dist < self.radius) {
            return None;
        }
        let s = self.force_scale(dist);

        let inv_dist = 1.0 / (dist + DISTANCE_EPSILON);
        let depth_sign = delta.z / (delta.z.abs() + DISTANCE_EPSILON);
        Some(Vec3::new(
            delta.x * inv_dist * s * jitter(),
            delta.y * inv_dist * s * jitter(),
            depth_sign * s * self.depth_nudge,
        ))
    }
}

/// Counters from one [`ParticleField::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Stars that were inside the repulsion radius.
    pub repelled: u32,
    /// Stars moved back into the reseed shell.
    pub reseeded: u32,
    /// The step was rejected and nothing moved.
    pub skipped: bool,
}

/// Fixed-size buffer of stars and the rules that move them.
#[derive(Debug, Clone)]
pub struct ParticleField {
    stars: Vec<Star>,
    /// Render-facing copy of the positions, refreshed after each full pass.
    published: Vec<Vec3>,
    generation: u64,
    dirty: bool,
    repulsion: RepulsionField,
    drift: DriftConfig,
    reseed_shell: ShellConfig,
    wrap_radius_sq: f32,
    spawner: StarSpawner,
    last_pointer: Vec3,
}

impl ParticleField {
    /// Spawn `config.star_count` stars in the spawn shell.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: &StarfieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut spawner = StarSpawner::new(config.seed);
        let stars = (0..config.star_count)
            .map(|_| {
                let position =
                    spawner.sample_shell(config.spawn_shell.r_min, config.spawn_shell.r_max);
                let velocity = spawner.drift_velocity(config.drift.max_speed);
                let color = spawner.star_color(&config.star_color);
                Star::new(position, velocity, color)
            })
            .collect();

        log::info!(
            "spawned {} stars in shell [{}, {}] (seed: {:?})",
            config.star_count,
            config.spawn_shell.r_min,
            config.spawn_shell.r_max,
            config.seed
        );
        Ok(Self::assemble(config, stars, spawner))
    }

    /// Build a field from explicit stars; `config.star_count` is ignored.
    pub fn from_stars(config: &StarfieldConfig, stars: Vec<Star>) -> Result<Self, ConfigError> {
        if stars.is_empty() {
            return Err(ConfigError::invalid("star_count", "must be greater than 0"));
        }
        config.validate()?;
        let invalid = stars
            .iter()
            .any(|s| !(s.position.is_finite() && s.velocity.is_finite() && s.color.is_finite()));
        if invalid {
            return Err(ConfigError::invalid("stars", "every component must be finite"));
        }
        let spawner = StarSpawner::new(config.seed);
        Ok(Self::assemble(config, stars, spawner))
    }

    fn assemble(config: &StarfieldConfig, stars: Vec<Star>, spawner: StarSpawner) -> Self {
        let published = stars.iter().map(|s| s.position).collect();
        Self {
            stars,
            published,
            generation: 0,
            dirty: true,
            repulsion: config.repulsion,
            drift: config.drift,
            reseed_shell: config.reseed_shell,
            wrap_radius_sq: config.wrap_radius * config.wrap_radius,
            spawner,
            last_pointer: Vec3::ZERO,
        }
    }

    /// Advance every star by one frame.
    ///
    /// A non-finite or negative `dt` rejects the whole step. A non-finite
    /// pointer is replaced by the last finite one seen.
    pub fn step(&mut self, dt: f32, pointer: Vec3) -> StepStats {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("rejected frame delta {}; holding star positions", dt);
            return StepStats {
                skipped: true,
                ..Default::default()
            };
        }
        let pointer = if pointer.is_finite() {
            self.last_pointer = pointer;
            pointer
        } else {
            log::warn!("rejected pointer {:?}; using {:?}", pointer, self.last_pointer);
            self.last_pointer
        };

        let drift_scale = match self.drift.mode {
            DriftMode::PerFrame => 1.0,
            DriftMode::TimeScaled { reference_fps } => dt * reference_fps,
        };
        let (jitter_min, jitter_max) = (self.repulsion.jitter_min, self.repulsion.jitter_max);

        let mut stats = StepStats::default();
        for star in &mut self.stars {
            let mut position = star.position + star.velocity * drift_scale;

            let push = self.repulsion.displacement(position, pointer, || {
                self.spawner.random_range(jitter_min, jitter_max)
            });
            if let Some(push) = push {
                position += push;
                stats.repelled += 1;
            }

            if !position.is_finite() || position.length_squared() > self.wrap_radius_sq {
                position = self
                    .spawner
                    .sample_shell(self.reseed_shell.r_min, self.reseed_shell.r_max);
                stats.reseeded += 1;
            }

            star.position = position;
        }

        self.publish();
        if stats.reseeded > 0 {
            log::trace!("generation {}: reseeded {} stars", self.generation, stats.reseeded);
        }
        stats
    }

    fn publish(&mut self) {
        for (dst, star) in self.published.iter_mut().zip(&self.stars) {
            *dst = star.position;
        }
        self.generation += 1;
        self.dirty = true;
    }

    /// Number of stars; constant for the lifetime of the field.
    #[inline]
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// All stars as of the last published pass.
    #[inline]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Published positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.published
    }

    /// Published positions as a flat `[x, y, z, x, y, z, ...]` array of `3 * len()` floats.
    #[inline]
    pub fn position_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.published)
    }

    /// Per-star colors in star order.
    pub fn colors(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.stars.iter().map(|s| s.color)
    }

    /// Number of published passes so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether positions changed since the last call; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Repulsion profile in use.
    #[inline]
    pub fn repulsion(&self) -> &RepulsionField {
        &self.repulsion
    }

    /// Last finite pointer passed to [`step`](Self::step).
    #[inline]
    pub fn last_pointer(&self) -> Vec3 {
        self.last_pointer
    }
}
