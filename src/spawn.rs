//! Random placement and tinting of stars.
//!
//! [`sample_shell`] is the spatial sampler: a pure function of the random
//! source it is handed. [`StarSpawner`] owns the seeded generator the field
//! uses for spawning, reseeding and per-frame jitter, so a fixed seed gives a
//! fully reproducible run.

use crate::config::StarColorConfig;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random point uniformly distributed by volume in the shell `[r_min, r_max]`.
///
/// The radius is drawn by inverting the cumulative volume,
/// `r = cbrt(u * (r_max³ - r_min³) + r_min³)`, so outer radii are weighted by
/// `r²`. The polar angle is `acos(2u - 1)` which keeps the poles from
/// clustering, and the azimuth is uniform on `[0, 2π)`.
pub fn sample_shell<R: Rng + ?Sized>(rng: &mut R, r_min: f32, r_max: f32) -> Vec3 {
    let min3 = r_min * r_min * r_min;
    let max3 = r_max * r_max * r_max;
    let r = (rng.gen::<f32>() * (max3 - min3) + min3).cbrt();
    let theta = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let phi = rng.gen::<f32>() * TAU;

    Vec3::new(
        r * theta.sin() * phi.cos(),
        r * theta.sin() * phi.sin(),
        r * theta.cos(),
    )
}

/// Seeded random source shared by everything the field randomizes.
#[derive(Debug, Clone)]
pub struct StarSpawner {
    rng: SmallRng,
}

impl StarSpawner {
    /// Deterministic spawner for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Spawner seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`; returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// See [`sample_shell`].
    pub fn sample_shell(&mut self, r_min: f32, r_max: f32) -> Vec3 {
        sample_shell(&mut self.rng, r_min, r_max)
    }

    /// Constant drift velocity, each axis uniform in `[-max_speed, max_speed)`.
    pub fn drift_velocity(&mut self, max_speed: f32) -> Vec3 {
        Vec3::new(
            (self.random() - 0.5) * 2.0 * max_speed,
            (self.random() - 0.5) * 2.0 * max_speed,
            (self.random() - 0.5) * 2.0 * max_speed,
        )
    }

    /// Star tint around a base hue with jittered hue and lightness.
    pub fn star_color(&mut self, palette: &StarColorConfig) -> Vec3 {
        let hue = palette.hue + palette.hue_spread * (self.random() - 0.5);
        let lightness = palette.lightness + palette.lightness_spread * (self.random() - 0.5);
        hsl_to_rgb(hue, palette.saturation, lightness)
    }
}

/// Convert HSL (all components 0-1, hue wraps) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

/// Convert a `0xRRGGBB` literal to RGB in 0-1.
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
