//! GPU rendering for the starfield.
//!
//! [`Renderer`] owns the wgpu surface and device and draws one frame of a
//! [`Starfield`]: star sprites first, then the lit planets with their glow
//! halos on top, over a near-black background.
//!
//! Star colors are uploaded once. Star positions are re-uploaded only when
//! the field has published a new generation.

mod sprites;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::app::Starfield;
use crate::error::GpuError;
use sprites::{PlanetInstance, SpriteUniforms};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.02,
    a: 1.0,
};

/// Owns all GPU resources for drawing a [`Starfield`].
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    star_pipeline: wgpu::RenderPipeline,
    planet_pipeline: wgpu::RenderPipeline,
    star_positions: wgpu::Buffer,
    star_colors: wgpu::Buffer,
    num_stars: u32,
    planet_buffer: wgpu::Buffer,
    num_planets: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Generation of the positions currently in `star_positions`.
    uploaded_generation: u64,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, app: &Starfield) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Starfield Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let field = app.field();
        let star_positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Positions"),
            contents: bytemuck::cast_slice(field.position_data()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let colors: Vec<[f32; 3]> = field.colors().map(|c| c.to_array()).collect();
        let star_colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Colors"),
            contents: bytemuck::cast_slice(&colors),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let planets = sprites::planet_instances(app.orbits());
        let planet_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Planet Instances"),
            size: (planets.len().max(1) * std::mem::size_of::<PlanetInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&planet_buffer, 0, bytemuck::cast_slice(&planets));

        let uniforms = SpriteUniforms::from_camera(app.camera());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(sprites::SPRITE_SHADER.into()),
        });

        let star_pipeline = sprites::create_pipeline(
            &device,
            &pipeline_layout,
            &module,
            config.format,
            "Star Pipeline",
            "vs_star",
            "fs_star",
            &[sprites::STAR_POSITION_LAYOUT, sprites::STAR_COLOR_LAYOUT],
        );
        let planet_pipeline = sprites::create_pipeline(
            &device,
            &pipeline_layout,
            &module,
            config.format,
            "Planet Pipeline",
            "vs_planet",
            "fs_planet",
            &[sprites::PLANET_LAYOUT],
        );

        log::info!(
            "renderer ready: {}x{} {:?}, {} stars, {} planets",
            config.width,
            config.height,
            config.format,
            field.len(),
            planets.len()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            star_pipeline,
            planet_pipeline,
            star_positions,
            star_colors,
            num_stars: field.len() as u32,
            planet_buffer,
            num_planets: planets.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            uploaded_generation: field.generation(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Configure the surface again at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn upload(&mut self, app: &mut Starfield) {
        let field = app.field();
        if field.generation() != self.uploaded_generation {
            self.queue
                .write_buffer(&self.star_positions, 0, bytemuck::cast_slice(field.position_data()));
            self.uploaded_generation = field.generation();
            app.take_positions_dirty();
        }

        let planets = sprites::planet_instances(app.orbits());
        if !planets.is_empty() {
            self.queue
                .write_buffer(&self.planet_buffer, 0, bytemuck::cast_slice(&planets));
        }

        let uniforms = SpriteUniforms::from_camera(app.camera());
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&mut self, app: &mut Starfield) -> Result<(), wgpu::SurfaceError> {
        self.upload(app);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Starfield Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            render_pass.set_pipeline(&self.star_pipeline);
            render_pass.set_vertex_buffer(0, self.star_positions.slice(..));
            render_pass.set_vertex_buffer(1, self.star_colors.slice(..));
            render_pass.draw(0..6, 0..self.num_stars);

            if self.num_planets > 0 {
                render_pass.set_pipeline(&self.planet_pipeline);
                render_pass.set_vertex_buffer(0, self.planet_buffer.slice(..));
                render_pass.draw(0..6, 0..self.num_planets);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
