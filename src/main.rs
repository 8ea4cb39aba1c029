//! cubefall - audio-reactive cube waterfall
//!
//! Each frame the playing track's spectrum becomes the newest row of a cube
//! grid; older rows scroll back. Loud cubes glow through a selective bloom.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use cubefall::audio::AudioSystem;
use cubefall::camera::OrbitCamera;
use cubefall::cli::Args;
use cubefall::config::Config;
use cubefall::controls::{action_for_key, ControlSurface, TrackRequest};
use cubefall::driver::Visualizer;
use cubefall::error::RenderError;
use cubefall::rendering::Renderer;
use cubefall::tracks::TrackList;

/// Pixels of smooth scrolling treated as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// Main application state
struct App {
    config: Config,

    // Window and rendering
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,

    // Visualization
    visualizer: Visualizer,
    camera: OrbitCamera,
    audio: Option<AudioSystem>,

    // Input
    controls: ControlSurface,
    tracks: TrackList,
    dragging: bool,
    cursor: Option<(f64, f64)>,

    title: String,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        let visualizer = Visualizer::new(
            &config.grid,
            config.audio.bin_count(),
            config.bloom,
            config.mapping.clone(),
        );
        let camera = OrbitCamera::new(config.camera.clone(), &config.window);
        let tracks = config.track_list();

        Self {
            config,
            window: None,
            renderer: None,
            visualizer,
            camera,
            audio: None,
            controls: ControlSurface::new(),
            tracks,
            dragging: false,
            cursor: None,
            title: String::new(),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("cubefall")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.window_width,
                self.config.window.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            self.visualizer.grid.len(),
        ))
        .context("Failed to initialize renderer")?;

        let size = window.inner_size();
        self.camera.set_viewport(size.width, size.height);

        // No output device is not fatal; the grid just stays silent
        match AudioSystem::new(self.config.audio.clone()) {
            Ok(mut audio) => {
                if let Some(track) = self.tracks.current() {
                    audio.load(track);
                }
                self.audio = Some(audio);
            }
            Err(e) => self
                .controls
                .report_error(format!("audio unavailable: {}", e)),
        }

        log::info!(
            "Grid {}x{}, {} bins per frame",
            self.visualizer.grid.columns(),
            self.visualizer.grid.rows(),
            self.config.audio.bin_count()
        );
        log::info!("Q/A threshold, W/S strength, E/D radius, R/F exposure, Tab/1-9 tracks, Esc quits");

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Install finished track loads and surface failures
    fn poll_audio(&mut self) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };

        match audio.poll() {
            Some(Ok(path)) => {
                log::info!("Playing {}", path.display());
                self.controls.clear_status();
            }
            Some(Err(e)) => self.controls.report_error(format!("track load failed: {}", e)),
            None => {}
        }
    }

    /// Stop the current track and load the requested one
    fn switch_track(&mut self) {
        let Some(request) = self.controls.take_track_request() else {
            return;
        };

        let track = match request {
            TrackRequest::Next => self.tracks.select_next(),
            TrackRequest::Index(i) => self.tracks.select(i),
        };

        match (track, self.audio.as_mut()) {
            (Some(track), Some(audio)) => audio.load(track),
            (Some(_), None) => self.controls.report_error("audio unavailable"),
            (None, _) => {
                if let TrackRequest::Index(i) = request {
                    log::debug!("No track in slot {}", i + 1);
                }
            }
        }
    }

    fn update_title(&mut self) {
        let track = self.tracks.current().map(|t| t.name.as_str());
        let title = self.controls.title(&self.visualizer.params, track);
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_audio();
        self.switch_track();
        self.controls.apply_pending(&mut self.visualizer.params);

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.update_camera(self.camera.view_proj());

        match self.visualizer.tick(&mut self.audio, renderer) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                renderer.reconfigure();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::debug!("Surface timeout, frame skipped");
            }
            Err(e) => log::error!("Render error: {}", e),
        }

        self.update_title();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(action) = action_for_key(code) {
                    if !self.controls.push(action) {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    if renderer.resize(size.width, size.height) {
                        self.camera.set_viewport(size.width, size.height);
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some((x, y))) = (self.dragging, self.cursor) {
                    self.camera
                        .rotate((position.x - x) as f32, (position.y - y) as f32);
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let mut config =
        Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop failed")?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
