//! # Starfield
//!
//! An ambient 3D backdrop: tens of thousands of softly glowing stars (20,000
//! by default) drifting inside a spherical shell, pushed aside by the pointer,
//! with two lit planets on slow Lissajous-like orbits near the center.
//!
//! The simulation is plain CPU code and runs without a window or GPU, so it
//! can be driven by any host. The bundled binary opens a winit window and
//! draws with wgpu.
//!
//! ## Quick Start
//!
//! ```ignore
//! use starfield::prelude::*;
//!
//! fn main() -> Result<(), StarfieldError> {
//!     let config = StarfieldConfig::default()
//!         .with_star_count(20_000)
//!         .with_seed(7);
//!     starfield::run(config)
//! }
//! ```
//!
//! ## Frame Pipeline
//!
//! Every frame runs the same fixed sequence:
//!
//! 1. [`FrameClock::tick`] turns the host timestamp into a clamped `dt`
//! 2. the camera dollies out slowly
//! 3. the latest pointer event is projected onto the reference plane
//! 4. [`ParticleField::step`] drifts, repels and reseeds every star, then
//!    publishes the new positions
//! 5. [`OrbitDriver::advance`] moves and spins the planets
//!
//! ## Headless Use
//!
//! ```ignore
//! let mut app = Starfield::init(StarfieldConfig::default())?;
//! app.resize(1280, 720);
//! app.pointer_moved(Vec2::new(640.0, 360.0), SurfaceRect::from_size(1280, 720));
//! let report = app.frame(16.0);
//! let positions = app.field().positions();
//! ```
//!
//! ## Configuration
//!
//! [`StarfieldConfig`] is serde-serializable; the binary accepts a JSON file
//! path as its first argument. Missing fields fall back to their defaults.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod orbit;
pub mod pointer;
pub mod spawn;
pub mod time;
mod window;

pub use app::{run_loop, FrameHost, FrameReport, Starfield, StopSignal};
pub use camera::{CameraRig, CameraState};
pub use config::{
    CameraConfig, ClockConfig, DriftConfig, DriftMode, OrbitAxis, OrbitBodyConfig, OrbitConfig,
    RepulsionField, ShellConfig, StarColorConfig, StarfieldConfig, Wave,
};
pub use error::{ConfigError, GpuError, StarfieldError};
pub use field::{ParticleField, Star, StepStats};
pub use glam::{Vec2, Vec3};
pub use orbit::{BodyTransform, OrbitBody, OrbitDriver};
pub use pointer::{client_to_ndc, Plane, PointerProjector, PointerState, Ray, SurfaceRect};
pub use spawn::{sample_shell, StarSpawner};
pub use time::FrameClock;
pub use window::{run, run_until};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use starfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{FrameHost, FrameReport, Starfield, StopSignal};
    pub use crate::config::{DriftMode, StarfieldConfig};
    pub use crate::error::StarfieldError;
    pub use crate::field::ParticleField;
    pub use crate::orbit::OrbitDriver;
    pub use crate::pointer::{Plane, PointerProjector, SurfaceRect};
    pub use crate::time::FrameClock;
    pub use crate::{run, Vec2, Vec3};
}
