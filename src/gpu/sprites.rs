//! Camera-facing sprites for stars and planets.
//!
//! Stars are drawn from two per-instance vertex buffers: positions, which
//! change every frame, and colors, which are written once. Planets use a
//! single small instance buffer rebuilt each frame. Both pipelines expand
//! each instance into a quad in the vertex shader, so no vertex buffer for
//! the quad itself is needed.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::CameraState;
use crate::orbit::OrbitDriver;

/// World-space edge length of a star sprite.
pub const STAR_SIZE: f32 = 0.6;

/// Glow sprites span this many planet radii.
pub const GLOW_SCALE: f32 = 6.0;

/// Directional light position; the light shines towards the origin.
pub const LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Strength of the directional light on planet surfaces.
pub const LIGHT_INTENSITY: f32 = 1.1;

/// Ambient term: `#446688` at 0.25.
pub const AMBIENT: [f32; 3] = [
    0x44 as f32 / 255.0 * 0.25,
    0x66 as f32 / 255.0 * 0.25,
    0x88 as f32 / 255.0 * 0.25,
];

/// Per-frame uniforms shared by both pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Camera right axis; `w` holds the star sprite size.
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    /// Light direction in view space; `w` holds the light intensity.
    pub light_view: [f32; 4],
    /// Ambient color; `w` holds the glow half-span in planet radii.
    pub ambient: [f32; 4],
}

impl SpriteUniforms {
    pub fn from_camera(camera: &CameraState) -> Self {
        let (forward, right, up) = camera.basis().unwrap_or((Vec3::NEG_Z, Vec3::X, Vec3::Y));
        let light = LIGHT_POSITION.normalize();
        // View space: x right, y up, z towards the viewer.
        let light_view = Vec3::new(light.dot(right), light.dot(up), -light.dot(forward));
        let view_proj: Mat4 = camera.view_proj();

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_right: right.extend(STAR_SIZE).to_array(),
            camera_up: up.extend(0.0).to_array(),
            light_view: light_view.extend(LIGHT_INTENSITY).to_array(),
            ambient: [AMBIENT[0], AMBIENT[1], AMBIENT[2], GLOW_SCALE * 0.5],
        }
    }
}

/// One planet sprite.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PlanetInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    /// Spin around the body's own Y axis in radians.
    pub spin: f32,
}

/// Planet instances in world space for the current orbit state.
pub fn planet_instances(orbits: &OrbitDriver) -> Vec<PlanetInstance> {
    orbits
        .bodies()
        .iter()
        .map(|body| PlanetInstance {
            position: orbits.world_position(body).to_array(),
            radius: body.radius(),
            color: body.color().to_array(),
            spin: body.transform().spin,
        })
        .collect()
}

pub const STAR_POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }],
};

pub const STAR_COLOR_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    }],
};

pub const PLANET_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<PlanetInstance>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 0,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 16,
            shader_location: 1,
        },
    ],
};

/// Build one alpha-blended sprite pipeline.
pub fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    vs_entry: &str,
    fs_entry: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub const SPRITE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    light_view: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) spin: f32,
};

fn quad_corner(index: u32) -> vec2<f32> {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    return corners[index];
}

fn billboard(center: vec3<f32>, corner: vec2<f32>, half_size: f32) -> vec4<f32> {
    let offset = uniforms.camera_right.xyz * corner.x + uniforms.camera_up.xyz * corner.y;
    return uniforms.view_proj * vec4<f32>(center + offset * half_size, 1.0);
}

fn to_linear(c: vec3<f32>) -> vec3<f32> {
    return pow(c, vec3<f32>(2.2));
}

@vertex
fn vs_star(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VertexOutput {
    let corner = quad_corner(vertex_index);
    var out: VertexOutput;
    out.clip_position = billboard(position, corner, uniforms.camera_right.w * 0.5);
    out.color = to_linear(color);
    out.uv = corner;
    out.spin = 0.0;
    return out;
}

@fragment
fn fs_star(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = (1.0 - smoothstep(0.4, 1.0, dist)) * 0.95;
    return vec4<f32>(in.color, alpha);
}

@vertex
fn vs_planet(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position_radius: vec4<f32>,
    @location(1) color_spin: vec4<f32>,
) -> VertexOutput {
    let corner = quad_corner(vertex_index);
    // Quad covers the glow halo.
    let glow_span = uniforms.ambient.w;
    let half_size = position_radius.w * glow_span;
    var out: VertexOutput;
    out.clip_position = billboard(position_radius.xyz, corner, half_size);
    out.color = to_linear(color_spin.xyz);
    out.uv = corner * glow_span;
    out.spin = color_spin.w;
    return out;
}

@fragment
fn fs_planet(in: VertexOutput) -> @location(0) vec4<f32> {
    let r = length(in.uv);
    if r <= 1.0 {
        let normal = vec3<f32>(in.uv, sqrt(max(1.0 - r * r, 0.0)));
        let diffuse = max(dot(normal, normalize(uniforms.light_view.xyz)), 0.0) * uniforms.light_view.w;
        let longitude = atan2(normal.x, normal.z) + in.spin;
        let bands = 0.88 + 0.12 * sin(longitude * 5.0 + normal.y * 4.0);
        let lit = in.color * bands * (uniforms.ambient.xyz + vec3<f32>(diffuse));
        return vec4<f32>(lit, 1.0);
    }
    // Halo: radial gradient 1 -> 0.5 at 30% -> 0 at the rim, at 0.45 opacity.
    let g = r / uniforms.ambient.w;
    var glow: f32;
    if g < 0.3 {
        glow = mix(1.0, 0.5, g / 0.3);
    } else {
        glow = mix(0.5, 0.0, clamp((g - 0.3) / 0.7, 0.0, 1.0));
    }
    return vec4<f32>(in.color, glow * 0.45);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrbitConfig;

    #[test]
    fn test_uniform_layout_is_aligned() {
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 128);
        assert_eq!(std::mem::size_of::<PlanetInstance>(), 32);
    }

    #[test]
    fn test_uniforms_carry_camera_axes() {
        let camera = CameraState::looking_at_origin(Vec3::new(0.0, 0.0, 60.0), 1.0, 1.5);
        let u = SpriteUniforms::from_camera(&camera);
        assert!((Vec3::from_slice(&u.camera_right[..3]) - Vec3::X).length() < 1e-5);
        assert!((Vec3::from_slice(&u.camera_up[..3]) - Vec3::Y).length() < 1e-5);
        assert_eq!(u.camera_right[3], STAR_SIZE);
        // Light at (10, 10, 10) seen from +Z is up, right and towards the viewer.
        assert!(u.light_view[0] > 0.0 && u.light_view[1] > 0.0 && u.light_view[2] > 0.0);
    }

    #[test]
    fn test_uniforms_carry_glow_span() {
        let camera = CameraState::looking_at_origin(Vec3::new(0.0, 0.0, 60.0), 1.0, 1.5);
        let u = SpriteUniforms::from_camera(&camera);
        // Half of a halo six radii across.
        assert_eq!(u.ambient[3], 3.0);
        assert_eq!(&u.ambient[..3], &AMBIENT[..]);
    }

    #[test]
    fn test_planet_instances_follow_orbits() {
        let mut orbits = OrbitDriver::new(&OrbitConfig::default());
        orbits.advance(0.5);
        let instances = planet_instances(&orbits);
        assert_eq!(instances.len(), orbits.bodies().len());
        for (instance, body) in instances.iter().zip(orbits.bodies()) {
            assert_eq!(Vec3::from(instance.position), orbits.world_position(body));
            assert_eq!(instance.radius, body.radius());
            assert_eq!(instance.spin, body.transform().spin);
        }
    }
}
