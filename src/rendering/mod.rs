//! GPU side of the selective bloom compositor.
//!
//! `Renderer` owns the surface, the cube pass and both composers, and
//! implements [`CompositeTarget`] so the frame driver can run the bloom and
//! final passes without knowing about wgpu.

mod bloom;
mod composer;
mod cubes;
mod post;
mod targets;

use std::sync::Arc;

use glam::Mat4;

pub use bloom::{
    gaussian_coefficients, lerp_bloom_factor, mip_sizes, mip_weights, BLOOM_FACTORS,
    KERNEL_RADII, LUMINOSITY_THRESHOLD, MIP_COUNT, SMOOTH_WIDTH,
};
pub use cubes::{collect_instances, CubeInstance};
pub use targets::{Viewport, HDR_FORMAT};

use composer::{FrameTargets, SceneContext};
use cubes::CubePass;

use crate::compositor::CompositeTarget;
use crate::error::RenderError;
use crate::grid::Grid;
use crate::params::BloomParameters;

/// Rendering system managing the wgpu device, surface and composers
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    cubes: CubePass,
    targets: FrameTargets,
}

impl Renderer {
    /// Create the rendering system for `window`, sized for `cube_capacity`
    /// instances up front
    pub async fn new(
        window: Arc<winit::window::Window>,
        cube_capacity: usize,
    ) -> Result<Self, RenderError> {
        let inner = window.inner_size();
        let size = Viewport::new(inner.width, inner.height).unwrap_or(Viewport {
            width: 1,
            height: 1,
        });

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
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
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        let cubes = CubePass::new(&device, cube_capacity);
        let targets = FrameTargets::new(&device, size, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            cubes,
            targets,
        })
    }

    /// Resize the surface, depth buffer and both composers.
    ///
    /// Zero-sized requests (minimized windows) are ignored and return false.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let Some(size) = Viewport::new(width, height) else {
            return false;
        };

        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);

        self.targets.resize(&self.device, size);

        log::info!("Resized to {}x{}", size.width, size.height);
        true
    }

    /// Reconfigure the surface at its current size (lost/outdated surfaces)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn update_camera(&self, view_proj: Mat4) {
        self.cubes.update_camera(&self.queue, view_proj);
    }
}

impl CompositeTarget for Renderer {
    type Error = RenderError;

    fn render_bloom(&mut self, grid: &Grid, params: &BloomParameters) -> Result<(), RenderError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Bloom Encoder"),
            });

        self.targets.bloom_composer.render(
            SceneContext {
                device: &self.device,
                queue: &self.queue,
                cubes: &mut self.cubes,
                depth: &self.targets.depth,
                grid,
                params,
            },
            &mut encoder,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn render_final(&mut self, grid: &Grid, params: &BloomParameters) -> Result<(), RenderError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Final Encoder"),
            });

        self.targets.final_composer.render(
            SceneContext {
                device: &self.device,
                queue: &self.queue,
                cubes: &mut self.cubes,
                depth: &self.targets.depth,
                grid,
                params,
            },
            &mut encoder,
            &view,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
