//! Error types for Starfield.
//!
//! The simulation core never fails once constructed. Errors only come from
//! configuration (validation, loading), GPU initialization and window setup.

use std::fmt;

/// Errors raised while loading or validating a [`StarfieldConfig`](crate::StarfieldConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// A configuration value is out of its allowed range.
    InvalidValue {
        /// Dotted path of the offending field, e.g. `repulsion.falloff`.
        field: &'static str,
        /// Human-readable constraint that was violated.
        reason: String,
    },
    /// Failed to read or write the configuration file.
    Io(std::io::Error),
    /// The configuration file is not valid JSON for this schema.
    Json(serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value `{}`: {}", field, reason)
            }
            ConfigError::Io(e) => write!(f, "Failed to access configuration file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the starfield.
#[derive(Debug)]
pub enum StarfieldError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
}

impl fmt::Display for StarfieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarfieldError::Config(e) => write!(f, "Configuration error: {}", e),
            StarfieldError::Gpu(e) => write!(f, "GPU error: {}", e),
            StarfieldError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            StarfieldError::Window(e) => write!(f, "Failed to create window: {}", e),
        }
    }
}

impl std::error::Error for StarfieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StarfieldError::Config(e) => Some(e),
            StarfieldError::Gpu(e) => Some(e),
            StarfieldError::EventLoop(e) => Some(e),
            StarfieldError::Window(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StarfieldError {
    fn from(e: ConfigError) -> Self {
        StarfieldError::Config(e)
    }
}

impl From<GpuError> for StarfieldError {
    fn from(e: GpuError) -> Self {
        StarfieldError::Gpu(e)
    }
}

impl From<winit::error::EventLoopError> for StarfieldError {
    fn from(e: winit::error::EventLoopError) -> Self {
        StarfieldError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for StarfieldError {
    fn from(e: winit::error::OsError) -> Self {
        StarfieldError::Window(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_value_message_names_field() {
        let err = ConfigError::invalid("repulsion.radius", "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("repulsion.radius"));
        assert!(msg.contains("must be positive"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_error_wraps_into_starfield_error() {
        let err: StarfieldError = ConfigError::invalid("star_count", "must be > 0").into();
        assert!(matches!(err, StarfieldError::Config(_)));
        assert!(err.source().is_some());
    }
}
