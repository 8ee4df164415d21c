//! Desktop host: a winit window driving a [`Starfield`] and its [`Renderer`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::app::{FrameReport, Starfield, StopSignal};
use crate::config::StarfieldConfig;
use crate::error::StarfieldError;
use crate::gpu::Renderer;
use crate::pointer::SurfaceRect;

const WINDOW_TITLE: &str = "Starfield";
const TITLE_INTERVAL: Duration = Duration::from_millis(500);

/// Open a window and run the backdrop until it is closed.
pub fn run(config: StarfieldConfig) -> Result<(), StarfieldError> {
    run_until(config, StopSignal::new())
}

/// Like [`run`], but also ends when `stop` fires.
pub fn run_until(config: StarfieldConfig, stop: StopSignal) -> Result<(), StarfieldError> {
    let starfield = Starfield::init(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(starfield, stop);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    starfield: Option<Starfield>,
    stop: StopSignal,
    start: Instant,
    last_title_update: Option<Instant>,
    error: Option<StarfieldError>,
}

impl App {
    fn new(starfield: Starfield, stop: StopSignal) -> Self {
        Self {
            window: None,
            renderer: None,
            starfield: Some(starfield),
            stop,
            start: Instant::now(),
            last_title_update: None,
            error: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), StarfieldError> {
        let Some(starfield) = self.starfield.as_mut() else {
            return Ok(());
        };

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let size = window.inner_size();
        starfield.resize(size.width, size.height);

        let renderer = pollster::block_on(Renderer::new(window.clone(), starfield))?;
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn surface_rect(&self) -> Option<SurfaceRect> {
        let size = self.window.as_ref()?.inner_size();
        Some(SurfaceRect::from_size(size.width, size.height))
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let Some(rect) = self.surface_rect() else {
            return;
        };
        if let Some(starfield) = self.starfield.as_mut() {
            starfield.pointer_moved(Vec2::new(x as f32, y as f32), rect);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop.is_stopped() {
            event_loop.exit();
            return;
        }
        let (Some(starfield), Some(renderer)) = (self.starfield.as_mut(), self.renderer.as_mut())
        else {
            return;
        };

        let now_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let report = starfield.frame(now_ms);
        let stars = starfield.field().len();

        match renderer.render(starfield) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory; shutting down");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }

        self.update_title(&report, stars);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update_title(&mut self, report: &FrameReport, stars: usize) {
        let Some(window) = &self.window else {
            return;
        };
        let now = Instant::now();
        let due = self
            .last_title_update
            .map_or(true, |last| now.duration_since(last) >= TITLE_INTERVAL);
        if due {
            window.set_title(&format!(
                "{} | Stars: {} | FPS: {:.0}",
                WINDOW_TITLE, stars, report.fps
            ));
            self.last_title_update = Some(now);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.create_window(event_loop) {
                log::error!("failed to start renderer: {}", err);
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(starfield) = &mut self.starfield {
                    starfield.resize(physical_size.width, physical_size.height);
                }
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y);
            }
            WindowEvent::Touch(touch) => {
                if matches!(touch.phase, TouchPhase::Started | TouchPhase::Moved) {
                    self.pointer_moved(touch.location.x, touch.location.y);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer = None;
        if let Some(starfield) = self.starfield.take() {
            starfield.teardown();
        }
        self.window = None;
    }
}
